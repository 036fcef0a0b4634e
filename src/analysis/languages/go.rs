//! Go feature extractor using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Query};

use crate::analysis::facts::{ClassFacts, FileFeatures, FunctionFacts, IdentifierKind, ImportRecord};
use crate::analysis::text::base_features;
use crate::analysis::treesitter::{
    check_grammar, count_control_flow, leading_comments, line_span, parse_strict, walk,
};
use crate::analysis::{ExtractionStrategy, FeatureExtractor, ParsedFile};

/// Tree-sitter query for control flow nodes (complexity calculation).
const CONTROL_FLOW_QUERY: &str = r#"
(if_statement) @if
(for_statement) @loop
(communication_case) @case
(expression_case) @case
(type_case) @case
(binary_expression operator: "&&") @bool
(binary_expression operator: "||") @bool
"#;

/// Import path prefix to test framework label.
const TEST_FRAMEWORKS: &[(&str, &str)] = &[
    ("testing", "testing"),
    ("github.com/stretchr/testify", "testify"),
    ("github.com/onsi/ginkgo", "ginkgo"),
    ("github.com/onsi/gomega", "gomega"),
];

pub struct GoExtractor {
    language: Language,
}

impl GoExtractor {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    fn collect(&self, parsed: &ParsedFile, features: &mut FileFeatures) -> anyhow::Result<()> {
        let query = Query::new(&self.language, CONTROL_FLOW_QUERY)?;

        walk(parsed.tree.root_node(), |node, scope| {
            match node.kind() {
                "function_declaration" | "method_declaration" => {
                    self.visit_function(node, parsed, &query, features);
                    return Ok(scope.enter_function());
                }
                "type_declaration" => {
                    let doc = doc_comment(node, parsed);
                    let mut cursor = node.walk();
                    for spec in node.named_children(&mut cursor) {
                        if spec.kind() != "type_spec" && spec.kind() != "type_alias" {
                            continue;
                        }
                        let name = spec
                            .child_by_field_name("name")
                            .map(|n| parsed.node_text(n).to_string())
                            .unwrap_or_default();
                        if let Some(doc) = &doc {
                            features.doc_delimiters.add(doc.delimiter);
                            features.doc_formats.add(doc.format_for(&name));
                        }
                        features.identifiers.push(IdentifierKind::Class, name.clone());
                        features.classes.push(ClassFacts {
                            name,
                            start_line: spec.start_position().row + 1,
                            documented: doc.is_some(),
                        });
                    }
                    return Ok(scope.enter_class());
                }
                "short_var_declaration" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        let mut cursor = left.walk();
                        for ident in left.named_children(&mut cursor) {
                            if ident.kind() == "identifier" {
                                let name = parsed.node_text(ident);
                                push_name(features, IdentifierKind::Variable, name);
                            }
                        }
                    }
                }
                "var_spec" => push_spec_names(node, parsed, IdentifierKind::Variable, features),
                "const_spec" => push_spec_names(node, parsed, IdentifierKind::Constant, features),
                "parameter_declaration" => {
                    push_spec_names(node, parsed, IdentifierKind::Variable, features)
                }
                "import_spec" => {
                    let module = node
                        .child_by_field_name("path")
                        .map(|p| parsed.node_text(p).trim_matches('"').to_string())
                        .unwrap_or_default();
                    let wildcard = node
                        .child_by_field_name("name")
                        .map(|n| n.kind() == "dot")
                        .unwrap_or(false);
                    features.imports.push(ImportRecord {
                        relative: module.starts_with("./") || module.starts_with("../"),
                        module,
                        wildcard,
                        line: node.start_position().row + 1,
                    });
                }
                _ => {}
            }
            Ok(scope)
        })?;

        for import in &features.imports {
            let framework = TEST_FRAMEWORKS.iter().find(|(prefix, _)| {
                import.module == *prefix || import.module.starts_with(&format!("{}/", prefix))
            });
            if let Some((_, label)) = framework {
                features.test_frameworks.add(label);
            }
        }
        Ok(())
    }

    fn visit_function(
        &self,
        node: Node,
        parsed: &ParsedFile,
        query: &Query,
        features: &mut FileFeatures,
    ) {
        let name = node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();
        let (start_line, line_count) = line_span(node);
        let doc = doc_comment(node, parsed);

        if let Some(doc) = &doc {
            features.doc_delimiters.add(doc.delimiter);
            features.doc_formats.add(doc.format_for(&name));
        }

        features.identifiers.push(IdentifierKind::Function, name.clone());
        features.functions.push(FunctionFacts {
            name,
            start_line,
            line_count,
            control_flow: count_control_flow(query, node, &parsed.source),
            documented: doc.is_some(),
            annotated: None,
        });
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn push_name(features: &mut FileFeatures, kind: IdentifierKind, name: &str) {
    if name != "_" {
        features.identifiers.push(kind, name);
    }
}

/// Record every `name:` field of a spec node (`var a, b int`).
fn push_spec_names(
    node: Node,
    parsed: &ParsedFile,
    kind: IdentifierKind,
    features: &mut FileFeatures,
) {
    let mut cursor = node.walk();
    let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
    for name in names {
        push_name(features, kind, parsed.node_text(name));
    }
}

/// A comment block directly above a declaration.
struct DocComment {
    delimiter: &'static str,
    text: String,
}

impl DocComment {
    /// Godoc convention: the comment starts with the declared name.
    fn format_for(&self, name: &str) -> &'static str {
        let body = self
            .text
            .trim_start_matches("//")
            .trim_start_matches("/*")
            .trim_start();
        if !name.is_empty() && body.starts_with(name) {
            "godoc"
        } else {
            "plain"
        }
    }
}

fn doc_comment(node: Node, parsed: &ParsedFile) -> Option<DocComment> {
    let comments = leading_comments(node, &["comment"], &[]);
    let first = comments.first()?;
    let text = parsed.node_text(*first).to_string();
    let delimiter = if text.starts_with("/*") { "/*" } else { "//" };
    Some(DocComment { delimiter, text })
}

impl FeatureExtractor for GoExtractor {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::SyntaxTree
    }

    fn prepare(&self) -> anyhow::Result<()> {
        check_grammar(&self.language, CONTROL_FLOW_QUERY)
    }

    fn extract_features(&self, path: &Path, source: &[u8]) -> anyhow::Result<FileFeatures> {
        let parsed = parse_strict(&self.language, path, source)?;
        let mut features = base_features(path, self.language_id(), parsed.source_str());
        self.collect(&parsed, &mut features)?;
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(path: &str, source: &str) -> FileFeatures {
        GoExtractor::new()
            .extract_features(Path::new(path), source.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_functions_types_and_docs() {
        let features = extract(
            "server.go",
            r#"package server

import (
	"fmt"
	. "strings"
)

const maxConns = 10

// Server handles connections.
type Server struct {
	name string
}

// Start launches the server.
func (s *Server) Start(port int) error {
	addr := fmt.Sprintf(":%d", port)
	if port == 0 || port > 65535 {
		return fmt.Errorf("bad port %s", addr)
	}
	return nil
}

func helper() {}
"#,
        );

        assert_eq!(features.classes.len(), 1);
        assert!(features.classes[0].documented);
        assert_eq!(features.functions.len(), 2);

        let start = &features.functions[0];
        assert_eq!(start.name, "Start");
        assert!(start.documented);
        // if + ||
        assert_eq!(start.complexity(), 3);
        assert_eq!(start.annotated, None);
        assert!(!features.functions[1].documented);

        assert_eq!(features.doc_formats.get("godoc"), 2);
        assert_eq!(features.identifiers.constants, vec!["maxConns".to_string()]);
        assert!(features.identifiers.variables.contains(&"addr".to_string()));
        assert!(features.identifiers.variables.contains(&"port".to_string()));

        assert_eq!(features.imports.len(), 2);
        assert!(!features.imports[0].wildcard);
        assert!(features.imports[1].wildcard);
        assert!(features.indentation.tab_lines > 0);
    }

    #[test]
    fn test_testing_framework_detection() {
        let features = extract(
            "server_test.go",
            "package server\n\nimport (\n\t\"testing\"\n\t\"github.com/stretchr/testify/assert\"\n)\n\nfunc TestStart(t *testing.T) {\n\tassert.True(t, true)\n}\n",
        );
        assert!(features.is_test_file);
        assert_eq!(features.test_frameworks.get("testing"), 1);
        assert_eq!(features.test_frameworks.get("testify"), 1);
    }
}
