//! Rust feature extractor using tree-sitter.
//!
//! Extracts:
//! - Free functions and impl methods
//! - Struct/enum/trait/union definitions (as class-like declarations)
//! - `let` bindings, parameters, consts and statics
//! - Use statements
//! - Outer doc comments (`///`, `/** */`)
//! - Test attributes for framework detection

use std::path::Path;

use tree_sitter::{Language, Node, Query};

use crate::analysis::facts::{ClassFacts, FileFeatures, FunctionFacts, IdentifierKind, ImportRecord};
use crate::analysis::text::base_features;
use crate::analysis::treesitter::{
    check_grammar, count_control_flow, identifiers_in, leading_comments, line_span, parse_strict,
    walk,
};
use crate::analysis::{ExtractionStrategy, FeatureExtractor, ParsedFile};

/// Tree-sitter query for control flow nodes (complexity calculation).
const CONTROL_FLOW_QUERY: &str = r#"
(if_expression) @if
(for_expression) @loop
(while_expression) @loop
(loop_expression) @loop
(match_arm) @case
(binary_expression operator: "&&") @bool
(binary_expression operator: "||") @bool
"#;

const CLASS_KINDS: &[&str] = &["struct_item", "enum_item", "trait_item", "union_item"];

pub struct RustExtractor {
    language: Language,
}

impl RustExtractor {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_rust::LANGUAGE.into(),
        }
    }

    fn collect(&self, parsed: &ParsedFile, features: &mut FileFeatures) -> anyhow::Result<()> {
        let query = Query::new(&self.language, CONTROL_FLOW_QUERY)?;

        walk(parsed.tree.root_node(), |node, scope| {
            let kind = node.kind();
            match kind {
                "function_item" => {
                    self.visit_function(node, parsed, &query, features);
                    return Ok(scope.enter_function());
                }
                _ if CLASS_KINDS.contains(&kind) => {
                    let name = node
                        .child_by_field_name("name")
                        .map(|n| parsed.node_text(n).to_string())
                        .unwrap_or_default();
                    let documented = record_doc(node, parsed, features);
                    features.identifiers.push(IdentifierKind::Class, name.clone());
                    features.classes.push(ClassFacts {
                        name,
                        start_line: node.start_position().row + 1,
                        documented,
                    });
                    return Ok(scope.enter_class());
                }
                "let_declaration" => {
                    if let Some(pattern) = node.child_by_field_name("pattern") {
                        for name in identifiers_in(pattern, parsed) {
                            features.identifiers.push(IdentifierKind::Variable, name);
                        }
                    }
                }
                "parameter" => {
                    if let Some(pattern) = node.child_by_field_name("pattern") {
                        for name in identifiers_in(pattern, parsed) {
                            features.identifiers.push(IdentifierKind::Variable, name);
                        }
                    }
                }
                "const_item" | "static_item" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        features
                            .identifiers
                            .push(IdentifierKind::Constant, parsed.node_text(name));
                    }
                }
                "use_declaration" => {
                    if let Some(argument) = node.child_by_field_name("argument") {
                        let module = parsed.node_text(argument).to_string();
                        features.imports.push(ImportRecord {
                            wildcard: argument.kind() == "use_wildcard" || module.ends_with("::*"),
                            relative: module.starts_with("self::") || module.starts_with("super::"),
                            module,
                            line: node.start_position().row + 1,
                        });
                    }
                }
                "attribute_item" => {
                    let text = parsed.node_text(node);
                    if text.contains("tokio::test") {
                        features.test_frameworks.add("tokio-test");
                    } else if text == "#[test]" {
                        features.test_frameworks.add("cargo-test");
                    }
                }
                "macro_invocation" => {
                    let is_proptest = node
                        .child_by_field_name("macro")
                        .map(|m| parsed.node_text(m) == "proptest")
                        .unwrap_or(false);
                    if is_proptest {
                        features.test_frameworks.add("proptest");
                    }
                }
                _ => {}
            }
            Ok(scope)
        })?;

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
        let documented = record_doc(node, parsed, features);

        features.identifiers.push(IdentifierKind::Function, name.clone());
        features.functions.push(FunctionFacts {
            name,
            start_line,
            line_count,
            control_flow: count_control_flow(query, node, &parsed.source),
            documented,
            annotated: None,
        });
    }
}

impl Default for RustExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the outer doc comment above `node`, returning whether one exists.
fn record_doc(node: Node, parsed: &ParsedFile, features: &mut FileFeatures) -> bool {
    let comments = leading_comments(node, &["line_comment", "block_comment"], &["attribute_item"]);
    let docs: Vec<&str> = comments
        .iter()
        .map(|c| parsed.node_text(*c))
        .filter(|text| {
            (text.starts_with("///") && !text.starts_with("////")) || text.starts_with("/**")
        })
        .collect();

    let Some(first) = docs.first() else {
        return false;
    };

    features
        .doc_delimiters
        .add(if first.starts_with("/**") { "/**" } else { "///" });
    let body = docs.join("\n");
    // rustdoc sections are markdown headings (`# Errors`, `# Examples`).
    let format = if body.contains("# ") { "rustdoc" } else { "plain" };
    features.doc_formats.add(format);
    true
}

impl FeatureExtractor for RustExtractor {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["rs"]
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

    fn extract(source: &str) -> FileFeatures {
        RustExtractor::new()
            .extract_features(Path::new("src/config_loader.rs"), source.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_functions_and_docs() {
        let features = extract(
            r#"
use std::collections::HashMap;
use super::*;

const MAX_DEPTH: usize = 8;

/// Loaded settings.
#[derive(Debug)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Look up a value.
    ///
    /// # Errors
    ///
    /// Fails when missing.
    pub fn get_value(&self, key: &str) -> Option<&String> {
        let found = self.values.get(key);
        if found.is_none() && key.is_empty() {
            return None;
        }
        found
    }

    fn helper(&self) {}
}
"#,
        );

        assert_eq!(features.classes.len(), 1);
        assert!(features.classes[0].documented);
        assert_eq!(features.functions.len(), 2);

        let get_value = &features.functions[0];
        assert_eq!(get_value.name, "get_value");
        assert!(get_value.documented);
        // if + &&
        assert_eq!(get_value.complexity(), 3);
        assert!(!features.functions[1].documented);

        assert_eq!(features.doc_delimiters.get("///"), 2);
        assert_eq!(features.doc_formats.get("rustdoc"), 1);
        assert_eq!(features.identifiers.constants, vec!["MAX_DEPTH".to_string()]);
        assert!(features.identifiers.variables.contains(&"found".to_string()));
        assert!(features.identifiers.variables.contains(&"key".to_string()));
        assert_eq!(features.identifiers.files, vec!["config_loader".to_string()]);

        assert_eq!(features.imports.len(), 2);
        assert!(features.imports[1].wildcard);
        assert!(features.imports[1].relative);
    }

    #[test]
    fn test_test_attribute_detection() {
        let features = extract("#[cfg(test)]\nmod tests {\n    #[test]\n    fn works() {}\n}\n");
        assert_eq!(features.test_frameworks.get("cargo-test"), 1);
    }
}
