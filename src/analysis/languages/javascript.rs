//! JavaScript and TypeScript feature extractor.
//!
//! No grammar is bundled for these languages. Structure is recovered with
//! regular expressions over comment-free, string-blanked lines plus brace
//! balancing; see [`ExtractionStrategy::Heuristic`] for the limits.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::facts::{
    ClassFacts, ControlFlowInfo, FileFeatures, FunctionFacts, IdentifierKind, ImportRecord,
    QuoteTally,
};
use crate::analysis::text::{base_features, brace_counts, classify_doc_format, scan_line};
use crate::analysis::{ExtractionStrategy, FeatureExtractor};

lazy_static! {
    static ref FUNCTION_DECL: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)"
    ).unwrap();

    /// `const name = function` / `const name = (a, b) =>` / `const name = a =>`
    static ref FUNCTION_EXPR: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=>)"
    ).unwrap();

    static ref METHOD: Regex = Regex::new(
        r"^\s*(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)\s+)*\*?(#?[A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\("
    ).unwrap();

    static ref CLASS_FIELD_ARROW: Regex = Regex::new(
        r"^\s*(?:(?:public|private|protected|static|readonly)\s+)*(#?[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=>"
    ).unwrap();

    static ref CLASS_DECL: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)"
    ).unwrap();

    static ref TS_TYPE_DECL: Regex = Regex::new(
        r"^\s*(?:export\s+)?(?:declare\s+)?(?:interface|enum)\s+([A-Za-z_$][\w$]*)"
    ).unwrap();

    static ref VARIABLE_DECL: Regex = Regex::new(r"\b(const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap();

    static ref PARAM_NAME: Regex = Regex::new(r"^\s*(?:\.\.\.)?([A-Za-z_$][\w$]*)").unwrap();

    static ref IMPORT_FROM: Regex = Regex::new(
        r#"^\s*(?:import|export)\s+(?:type\s+)?(.*?)\s*from\s+['"]([^'"]+)['"]"#
    ).unwrap();

    /// Closing line of a multi-line import list.
    static ref IMPORT_TAIL: Regex = Regex::new(r#"^\s*\}\s*from\s+['"]([^'"]+)['"]"#).unwrap();

    static ref IMPORT_BARE: Regex = Regex::new(r#"^\s*import\s+['"]([^'"]+)['"]"#).unwrap();

    static ref REQUIRE: Regex = Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();

    static ref BRANCH: Regex = Regex::new(r"\b(if|for|while|case|catch)\b").unwrap();

    static ref BOOL_OP: Regex = Regex::new(r"&&|\|\||\?\?").unwrap();

    static ref TERNARY: Regex = Regex::new(r"\s\?\s").unwrap();

    static ref TEST_CALL: Regex = Regex::new(r"^\s*(?:describe|it|test)\s*\(").unwrap();
}

/// Words the method pattern can match that are not method names.
const NOT_METHODS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "with", "do", "else", "new",
    "typeof", "await", "super", "yield",
];

/// Import specifier to test framework label. A trailing `/` matches a scope.
const TEST_FRAMEWORKS: &[(&str, &str)] = &[
    ("jest", "jest"),
    ("@jest/globals", "jest"),
    ("vitest", "vitest"),
    ("mocha", "mocha"),
    ("chai", "chai"),
    ("jasmine", "jasmine"),
    ("ava", "ava"),
    ("@testing-library/", "testing-library"),
];

/// Which member of the JavaScript family is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
}

pub struct JavaScriptExtractor {
    dialect: Dialect,
}

/// A source line after block comments are removed and strings blanked.
struct Line<'a> {
    raw: &'a str,
    code: String,
    /// Brace depth at the start of the line.
    depth: usize,
}

#[derive(Default)]
struct ScanState {
    in_block_comment: bool,
    in_template: bool,
}

impl JavaScriptExtractor {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn javascript() -> Self {
        Self::new(Dialect::JavaScript)
    }

    pub fn typescript() -> Self {
        Self::new(Dialect::TypeScript)
    }

    fn collect(&self, source: &str, features: &mut FileFeatures) {
        let (lines, quotes) = scan_lines(source);
        features.quotes = quotes;

        let mut class_bodies: Vec<usize> = Vec::new();
        let mut saw_test_call = false;

        for (i, line) in lines.iter().enumerate() {
            let code = line.code.as_str();
            if code.trim().is_empty() {
                continue;
            }
            while class_bodies.last().map(|d| line.depth < *d).unwrap_or(false) {
                class_bodies.pop();
            }

            self.collect_imports(line, i, features);
            saw_test_call |= TEST_CALL.is_match(code);

            let class_name = CLASS_DECL.captures(code).or_else(|| match self.dialect {
                Dialect::TypeScript => TS_TYPE_DECL.captures(code),
                Dialect::JavaScript => None,
            });
            if let Some(caps) = class_name {
                let name = caps[1].to_string();
                let documented = match doc_above(&lines, i) {
                    Some((delimiter, text)) => {
                        features.doc_delimiters.add(delimiter);
                        features.doc_formats.add(classify_doc_format(&text));
                        true
                    }
                    None => false,
                };
                features.identifiers.push(IdentifierKind::Class, name.clone());
                features.classes.push(ClassFacts {
                    name,
                    start_line: i + 1,
                    documented,
                });
                if code.trim_start().contains("class ") {
                    class_bodies.push(line.depth + 1);
                }
                continue;
            }

            let in_class_body = class_bodies.last() == Some(&line.depth);
            if let Some(name) = self.function_name(code, in_class_body) {
                self.record_function(&lines, i, name, features);
                continue;
            }

            for caps in VARIABLE_DECL.captures_iter(code) {
                let kind = if &caps[1] == "const" && line.depth == 0 {
                    IdentifierKind::Constant
                } else {
                    IdentifierKind::Variable
                };
                features.identifiers.push(kind, &caps[2]);
            }
        }

        for import in &features.imports {
            let framework = TEST_FRAMEWORKS.iter().find(|(spec, _)| {
                import.module == *spec || (spec.ends_with('/') && import.module.starts_with(spec))
            });
            if let Some((_, label)) = framework {
                features.test_frameworks.add(label);
            }
        }

        // describe/it/test globals without an import are jest's.
        if features.is_test_file && features.test_frameworks.is_empty() && saw_test_call {
            features.test_frameworks.add("jest");
        }
    }

    fn function_name(&self, code: &str, in_class_body: bool) -> Option<String> {
        if let Some(caps) = FUNCTION_DECL.captures(code).or_else(|| FUNCTION_EXPR.captures(code)) {
            return Some(caps[1].to_string());
        }
        if !in_class_body {
            return None;
        }
        if let Some(caps) = CLASS_FIELD_ARROW.captures(code) {
            return Some(caps[1].to_string());
        }
        // Overload signatures and abstract members end with `;`.
        if code.trim_end().ends_with(';') {
            return None;
        }
        METHOD
            .captures(code)
            .map(|caps| caps[1].to_string())
            .filter(|name| !NOT_METHODS.contains(&name.as_str()))
    }

    fn record_function(
        &self,
        lines: &[Line],
        start: usize,
        name: String,
        features: &mut FileFeatures,
    ) {
        let end = function_end(lines, start);
        let mut control_flow = ControlFlowInfo::default();
        for line in &lines[start..=end] {
            count_branches(&line.code, &mut control_flow);
        }

        let documented = match doc_above(lines, start) {
            Some((delimiter, text)) => {
                features.doc_delimiters.add(delimiter);
                features.doc_formats.add(classify_doc_format(&text));
                true
            }
            None => false,
        };

        let signature = lines[start].code.as_str();
        for param in parameter_names(signature) {
            features.identifiers.push(IdentifierKind::Variable, param);
        }

        let annotated = match self.dialect {
            Dialect::TypeScript => Some(signature_annotated(signature)),
            Dialect::JavaScript => None,
        };

        let name = name.trim_start_matches('#').to_string();
        if name != "constructor" {
            features.identifiers.push(IdentifierKind::Function, name.clone());
        }
        features.functions.push(FunctionFacts {
            name,
            start_line: start + 1,
            line_count: end - start + 1,
            control_flow,
            documented,
            annotated,
        });
    }

    fn collect_imports(&self, line: &Line, index: usize, features: &mut FileFeatures) {
        let code = line.code.trim_start();
        let mut push = |module: &str, wildcard: bool| {
            features.imports.push(ImportRecord {
                module: module.to_string(),
                wildcard,
                relative: module.starts_with('.'),
                line: index + 1,
            });
        };

        if code.starts_with("import") || code.starts_with("export") {
            if let Some(caps) = IMPORT_FROM.captures(line.raw) {
                let clause = caps[1].trim();
                let wildcard = clause.starts_with('*');
                push(&caps[2], wildcard);
                return;
            }
            if let Some(caps) = IMPORT_BARE.captures(line.raw) {
                push(&caps[1], false);
                return;
            }
        }
        if code.starts_with('}') {
            if let Some(caps) = IMPORT_TAIL.captures(line.raw) {
                push(&caps[1], false);
                return;
            }
        }
        if code.contains("require(") {
            for caps in REQUIRE.captures_iter(line.raw) {
                push(&caps[1], false);
            }
        }
    }
}

/// Remove block comments and blank strings, tracking brace depth.
fn scan_lines(source: &str) -> (Vec<Line<'_>>, QuoteTally) {
    let mut state = ScanState::default();
    let mut quotes = QuoteTally::default();
    let mut depth = 0usize;
    let mut lines = Vec::new();

    for raw in source.lines() {
        let (code, line_quotes) = scan_code_line(raw, &mut state);
        quotes.merge(&line_quotes);
        let (opens, closes) = brace_counts(&code);
        lines.push(Line { raw, code, depth });
        depth = (depth + opens).saturating_sub(closes);
    }

    (lines, quotes)
}

fn scan_code_line(raw: &str, state: &mut ScanState) -> (String, QuoteTally) {
    let mut code = String::new();
    let mut quotes = QuoteTally::default();
    let mut rest = raw;

    loop {
        if state.in_block_comment {
            match rest.find("*/") {
                Some(end) => {
                    code.push(' ');
                    rest = &rest[end + 2..];
                    state.in_block_comment = false;
                }
                None => break,
            }
        }

        let scanned = scan_line(rest, state.in_template);
        // `scan_line` emits one char per input char, so char offsets line up.
        let chars: Vec<char> = scanned.code.chars().collect();
        let comment_start = chars.windows(2).position(|w| w[0] == '/' && w[1] == '*');

        match comment_start {
            Some(char_idx) => {
                let byte_idx = rest
                    .char_indices()
                    .nth(char_idx)
                    .map(|(b, _)| b)
                    .unwrap_or(rest.len());
                let head = scan_line(&rest[..byte_idx], state.in_template);
                code.push_str(&head.code);
                quotes.merge(&head.quotes);
                state.in_template = head.open_template;
                state.in_block_comment = true;
                rest = rest.get(byte_idx + 2..).unwrap_or("");
            }
            None => {
                code.push_str(&scanned.code);
                quotes.merge(&scanned.quotes);
                state.in_template = scanned.open_template;
                break;
            }
        }
    }

    (code, quotes)
}

/// Last line of the function starting at `start`.
///
/// The body ends when brace depth returns to the signature's depth. A
/// signature terminated by `;`, or with no `{` within three lines, is a
/// concise arrow body and spans only its own line.
fn function_end(lines: &[Line], start: usize) -> usize {
    let signature = lines[start].code.trim_end();
    if !signature.contains('{') && signature.ends_with(';') {
        return start;
    }

    let base = lines[start].depth;
    let mut depth = base;
    let mut opened = false;

    for (offset, line) in lines[start..].iter().enumerate() {
        let (opens, closes) = brace_counts(&line.code);
        if opens > 0 {
            opened = true;
        }
        depth = (depth + opens).saturating_sub(closes);
        if opened && depth <= base {
            return start + offset;
        }
        if !opened && offset >= 2 {
            return start;
        }
    }

    lines.len().saturating_sub(1).max(start)
}

fn count_branches(code: &str, info: &mut ControlFlowInfo) {
    for caps in BRANCH.captures_iter(code) {
        match &caps[1] {
            "if" => info.if_count += 1,
            "for" | "while" => info.loop_count += 1,
            "case" => info.case_count += 1,
            "catch" => info.catch_count += 1,
            _ => {}
        }
    }
    info.bool_op_count += BOOL_OP.find_iter(code).count();
    info.ternary_count += TERNARY.find_iter(code).count();
}

/// A JSDoc block or `//` comment run directly above line `start`.
///
/// Decorator lines between the comment and the declaration are skipped.
fn doc_above(lines: &[Line], start: usize) -> Option<(&'static str, String)> {
    let mut idx = start;
    while idx > 0 && lines[idx - 1].raw.trim_start().starts_with('@') {
        idx -= 1;
    }
    if idx == 0 {
        return None;
    }

    let above = lines[idx - 1].raw.trim();
    if above.ends_with("*/") {
        let mut top = idx - 1;
        while top > 0 && !lines[top].raw.trim_start().starts_with("/*") {
            top -= 1;
        }
        if !lines[top].raw.trim_start().starts_with("/**") {
            return None;
        }
        let text = join_raw(&lines[top..idx]);
        return Some(("/**", text));
    }

    if above.starts_with("//") {
        let mut top = idx - 1;
        while top > 0 && lines[top - 1].raw.trim_start().starts_with("//") {
            top -= 1;
        }
        return Some(("//", join_raw(&lines[top..idx])));
    }

    None
}

fn join_raw(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.raw.trim())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte range of the first parenthesized group, exclusive of the parens.
fn parameter_span(code: &str) -> Option<(usize, Option<usize>)> {
    let open = code.find('(')?;
    let mut depth = 0usize;
    for (i, ch) in code[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, Some(open + i)));
                }
            }
            _ => {}
        }
    }
    Some((open, None))
}

fn parameter_names(code: &str) -> Vec<String> {
    let Some((open, Some(close))) = parameter_span(code) else {
        return Vec::new();
    };
    code[open + 1..close]
        .split(',')
        .filter_map(|piece| PARAM_NAME.captures(piece).map(|c| c[1].to_string()))
        .collect()
}

/// Whether a TypeScript signature annotates a parameter or its return type.
fn signature_annotated(code: &str) -> bool {
    match parameter_span(code) {
        Some((open, Some(close))) => {
            code[open + 1..close].contains(':') || code[close + 1..].trim_start().starts_with(':')
        }
        Some((open, None)) => code[open..].contains(':'),
        None => false,
    }
}

impl FeatureExtractor for JavaScriptExtractor {
    fn language_id(&self) -> &'static str {
        match self.dialect {
            Dialect::JavaScript => "javascript",
            Dialect::TypeScript => "typescript",
        }
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        match self.dialect {
            Dialect::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Dialect::TypeScript => &["ts", "tsx", "mts", "cts"],
        }
    }

    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Heuristic
    }

    fn extract_features(&self, path: &Path, source: &[u8]) -> anyhow::Result<FileFeatures> {
        let source = std::str::from_utf8(source)
            .map_err(|e| anyhow::anyhow!("{} is not valid UTF-8: {}", path.display(), e))?;
        let mut features = base_features(path, self.language_id(), source);
        self.collect(source, &mut features);
        Ok(features)
    }
}
