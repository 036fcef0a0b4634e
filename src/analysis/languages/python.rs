//! Python feature extractor using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Query};

use crate::analysis::facts::{ClassFacts, FileFeatures, FunctionFacts, IdentifierKind, ImportRecord};
use crate::analysis::text::{base_features, classify_doc_format};
use crate::analysis::treesitter::{
    check_grammar, count_control_flow, identifiers_in, line_span, parse_strict, walk, Scope,
};
use crate::analysis::{ExtractionStrategy, FeatureExtractor, ParsedFile};

const CONTROL_FLOW_QUERY: &str = r#"
(if_statement) @if
(elif_clause) @if
(conditional_expression) @ternary
(for_statement) @loop
(while_statement) @loop
(except_clause) @catch
(case_clause) @case
(boolean_operator) @bool
"#;

/// Root module name to test framework label.
const TEST_FRAMEWORKS: &[(&str, &str)] = &[
    ("pytest", "pytest"),
    ("unittest", "unittest"),
    ("nose", "nose"),
    ("nose2", "nose"),
    ("hypothesis", "hypothesis"),
];

/// Docstring attached to a function or class body.
struct Docstring {
    delimiter: &'static str,
    format: &'static str,
}

pub struct PythonExtractor {
    language: Language,
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn collect(&self, parsed: &ParsedFile, features: &mut FileFeatures) -> anyhow::Result<()> {
        let query = Query::new(&self.language, CONTROL_FLOW_QUERY)?;

        walk(parsed.tree.root_node(), |node, scope| {
            match node.kind() {
                "function_definition" => {
                    self.visit_function(node, parsed, &query, features);
                    return Ok(scope.enter_function());
                }
                "class_definition" => {
                    self.visit_class(node, parsed, features);
                    return Ok(scope.enter_class());
                }
                "assignment" => visit_assignment(node, scope, parsed, features),
                "import_statement" => {
                    let mut cursor = node.walk();
                    for name in node.children_by_field_name("name", &mut cursor) {
                        let module = match name.kind() {
                            "aliased_import" => name
                                .child_by_field_name("name")
                                .map(|n| parsed.node_text(n))
                                .unwrap_or(""),
                            _ => parsed.node_text(name),
                        };
                        features.imports.push(ImportRecord {
                            module: module.to_string(),
                            wildcard: false,
                            relative: false,
                            line: node.start_position().row + 1,
                        });
                    }
                }
                "import_from_statement" => {
                    let module = node.child_by_field_name("module_name");
                    let mut cursor = node.walk();
                    let wildcard = node
                        .children(&mut cursor)
                        .any(|c| c.kind() == "wildcard_import");
                    features.imports.push(ImportRecord {
                        module: module.map(|m| parsed.node_text(m)).unwrap_or("").to_string(),
                        wildcard,
                        relative: module.map(|m| m.kind() == "relative_import").unwrap_or(false),
                        line: node.start_position().row + 1,
                    });
                }
                "string" => {
                    if let Some(start) = node.named_child(0).filter(|n| n.kind() == "string_start") {
                        let delimiter = parsed
                            .node_text(start)
                            .trim_start_matches(|c: char| c.is_ascii_alphabetic());
                        match delimiter {
                            "'" => features.quotes.single += 1,
                            "\"" => features.quotes.double += 1,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
            Ok(scope)
        })?;

        self.detect_test_frameworks(features);
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
        let doc = node
            .child_by_field_name("body")
            .and_then(|body| docstring(body, parsed));

        if let Some(doc) = &doc {
            features.doc_delimiters.add(doc.delimiter);
            features.doc_formats.add(doc.format);
        }

        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                for ident in parameter_names(param, parsed) {
                    if ident != "self" && ident != "cls" {
                        features.identifiers.push(IdentifierKind::Variable, ident);
                    }
                }
            }
        }

        features.identifiers.push(IdentifierKind::Function, name.clone());
        features.functions.push(FunctionFacts {
            name,
            start_line,
            line_count,
            control_flow: count_control_flow(query, node, &parsed.source),
            documented: doc.is_some(),
            annotated: Some(has_annotations(node)),
        });
    }

    fn visit_class(&self, node: Node, parsed: &ParsedFile, features: &mut FileFeatures) {
        let name = node
            .child_by_field_name("name")
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_default();
        let doc = node
            .child_by_field_name("body")
            .and_then(|body| docstring(body, parsed));

        if let Some(doc) = &doc {
            features.doc_delimiters.add(doc.delimiter);
            features.doc_formats.add(doc.format);
        }

        features.identifiers.push(IdentifierKind::Class, name.clone());
        features.classes.push(ClassFacts {
            name,
            start_line: node.start_position().row + 1,
            documented: doc.is_some(),
        });
    }

    fn detect_test_frameworks(&self, features: &mut FileFeatures) {
        for import in &features.imports {
            let root = import.module.split('.').next().unwrap_or("");
            if let Some((_, label)) = TEST_FRAMEWORKS.iter().find(|(m, _)| *m == root) {
                features.test_frameworks.add(label);
            }
        }

        // Bare `def test_*` functions in a test file are collected by pytest.
        if features.is_test_file
            && features.test_frameworks.is_empty()
            && features.functions.iter().any(|f| f.name.starts_with("test_"))
        {
            features.test_frameworks.add("pytest");
        }
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Module-level names are recorded as constants, everything else as variables.
fn visit_assignment(node: Node, scope: Scope, parsed: &ParsedFile, features: &mut FileFeatures) {
    let Some(left) = node.child_by_field_name("left") else {
        return;
    };
    let kind = if scope.is_module_level() {
        IdentifierKind::Constant
    } else {
        IdentifierKind::Variable
    };
    for name in identifiers_in(left, parsed) {
        features.identifiers.push(kind, name);
    }
}

fn parameter_names(param: Node, parsed: &ParsedFile) -> Vec<String> {
    match param.kind() {
        "identifier" => vec![parsed.node_text(param).to_string()],
        "default_parameter" | "typed_default_parameter" => param
            .child_by_field_name("name")
            .map(|n| vec![parsed.node_text(n).to_string()])
            .unwrap_or_default(),
        "typed_parameter" => param
            .named_child(0)
            .filter(|n| n.kind() == "identifier")
            .map(|n| vec![parsed.node_text(n).to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn has_annotations(func: Node) -> bool {
    if func.child_by_field_name("return_type").is_some() {
        return true;
    }
    let Some(params) = func.child_by_field_name("parameters") else {
        return false;
    };
    let mut cursor = params.walk();
    let annotated = params
        .named_children(&mut cursor)
        .any(|p| matches!(p.kind(), "typed_parameter" | "typed_default_parameter"));
    annotated
}

/// The string literal opening a block, if any.
fn docstring(block: Node, parsed: &ParsedFile) -> Option<Docstring> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0).filter(|n| n.kind() == "string")?;
    let text = parsed.node_text(string);
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());

    let delimiter = if body.starts_with("\"\"\"") {
        "\"\"\""
    } else if body.starts_with("'''") {
        "'''"
    } else if body.starts_with('"') {
        "\""
    } else {
        "'"
    };

    Some(Docstring {
        delimiter,
        format: classify_doc_format(text),
    })
}

impl FeatureExtractor for PythonExtractor {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
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
