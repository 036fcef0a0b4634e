//! Mapping learned patterns onto linter and formatter settings.
//!
//! Every mapping is a pure function of the pattern name and value, so the
//! same patterns always produce the same rules.

use serde_json::{json, Value};

use crate::analysis::{LanguageMetrics, LineStats};
use crate::patterns::{NamingStyle, Pattern};

use super::result::{CustomRules, RuleSet};

/// Average line length above which the line limit is widened.
const LONG_LINE_AVERAGE: f64 = 100.0;
const WIDE_LINE_LIMIT: u64 = 120;

/// Tool family a language is configured through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Toolchain {
    Python,
    JavaScript,
    Go,
    Rust,
}

impl Toolchain {
    fn for_language(language: &str) -> Option<Self> {
        match language {
            "python" => Some(Toolchain::Python),
            "javascript" | "typescript" => Some(Toolchain::JavaScript),
            "go" => Some(Toolchain::Go),
            "rust" => Some(Toolchain::Rust),
            _ => None,
        }
    }
}

fn set(rules: &mut CustomRules, tool: &str, key: &str, value: Value) {
    rules
        .entry(tool.to_string())
        .or_insert_with(RuleSet::new)
        .insert(key.to_string(), value);
}

/// Rules implied by `patterns`, plus the line-length widening.
///
/// Patterns the toolchain has no setting for are ignored; unknown languages
/// get no rules.
pub fn derive_rules(language: &str, patterns: &[Pattern], line_stats: &LineStats) -> CustomRules {
    let mut rules = CustomRules::new();
    let Some(toolchain) = Toolchain::for_language(language) else {
        return rules;
    };

    for pattern in patterns {
        match toolchain {
            Toolchain::Python => python_rule(&mut rules, pattern),
            Toolchain::JavaScript => javascript_rule(&mut rules, language, pattern),
            Toolchain::Go => go_rule(&mut rules, pattern),
            Toolchain::Rust => rust_rule(&mut rules, pattern),
        }
    }

    if line_stats.average() > LONG_LINE_AVERAGE {
        match toolchain {
            Toolchain::Python => {
                set(&mut rules, "flake8", "max-line-length", json!(WIDE_LINE_LIMIT));
                set(&mut rules, "pylint", "max-line-length", json!(WIDE_LINE_LIMIT));
                set(&mut rules, "black", "line-length", json!(WIDE_LINE_LIMIT));
            }
            Toolchain::JavaScript => {
                set(&mut rules, "eslint", "max-len", json!(["error", { "code": WIDE_LINE_LIMIT }]));
                set(&mut rules, "prettier", "printWidth", json!(WIDE_LINE_LIMIT));
            }
            Toolchain::Go => {
                set(&mut rules, "golangci-lint", "lll.line-length", json!(WIDE_LINE_LIMIT));
            }
            Toolchain::Rust => {
                set(&mut rules, "rustfmt", "max_width", json!(WIDE_LINE_LIMIT));
            }
        }
    }

    rules
}

/// Complexity and function-length limits scaled from observed averages.
pub fn threshold_rules(language: &str, metrics: &LanguageMetrics) -> CustomRules {
    let mut rules = CustomRules::new();
    let Some(toolchain) = Toolchain::for_language(language) else {
        return rules;
    };

    let complexity = complexity_threshold(metrics.avg_complexity);
    let length = function_length_threshold(metrics.avg_function_size);

    match toolchain {
        Toolchain::Python => {
            set(&mut rules, "flake8", "max-complexity", json!(complexity));
            set(&mut rules, "flake8", "max-function-length", json!(length));
        }
        Toolchain::JavaScript => {
            set(&mut rules, "eslint", "complexity", json!(["warn", complexity]));
            set(&mut rules, "eslint", "max-lines-per-function", json!(["warn", length]));
        }
        Toolchain::Go => {
            set(&mut rules, "golangci-lint", "gocyclo.min-complexity", json!(complexity));
            set(&mut rules, "golangci-lint", "funlen.lines", json!(length));
        }
        Toolchain::Rust => {
            set(&mut rules, "clippy", "cognitive-complexity-threshold", json!(complexity));
            set(&mut rules, "clippy", "too-many-lines-threshold", json!(length));
        }
    }

    rules
}

/// `max(5, round(avg * 1.2))`
pub fn complexity_threshold(avg_complexity: f64) -> u64 {
    ((avg_complexity * 1.2).round() as u64).max(5)
}

/// `max(20, round(avg * 1.5))`
pub fn function_length_threshold(avg_function_size: f64) -> u64 {
    ((avg_function_size * 1.5).round() as u64).max(20)
}

/// Merge `extra` into `rules`; keys in `extra` win.
pub(crate) fn merge_rules(rules: &mut CustomRules, extra: CustomRules) {
    for (tool, settings) in extra {
        rules.entry(tool).or_default().extend(settings);
    }
}

fn text(pattern: &Pattern) -> Option<&str> {
    pattern.pattern_value.as_text()
}

fn naming_style(pattern: &Pattern) -> Option<NamingStyle> {
    text(pattern).and_then(NamingStyle::from_label)
}

fn pylint_style(style: NamingStyle) -> Option<&'static str> {
    match style {
        NamingStyle::SnakeCase => Some("snake_case"),
        NamingStyle::CamelCase => Some("camelCase"),
        NamingStyle::PascalCase => Some("PascalCase"),
        NamingStyle::UpperSnakeCase => Some("UPPER_CASE"),
        NamingStyle::KebabCase => None,
    }
}

fn python_rule(rules: &mut CustomRules, pattern: &Pattern) {
    let name = pattern.pattern_name.as_str();
    match name {
        "function_naming" | "class_naming" | "variable_naming" | "constant_naming" => {
            let key = match name {
                "function_naming" => "function-naming-style",
                "class_naming" => "class-naming-style",
                "variable_naming" => "variable-naming-style",
                _ => "const-naming-style",
            };
            if let Some(style) = naming_style(pattern).and_then(pylint_style) {
                set(rules, "pylint", key, json!(style));
            }
        }
        "quote_style" => match text(pattern) {
            Some("single") => {
                set(rules, "flake8", "inline-quotes", json!("single"));
                set(rules, "black", "skip-string-normalization", json!(true));
            }
            Some("double") => set(rules, "flake8", "inline-quotes", json!("double")),
            _ => {}
        },
        "indent_size" => {
            if let Some(size) = pattern.pattern_value.as_number() {
                set(rules, "flake8", "indent-size", json!(size as u64));
                set(rules, "pylint", "indent-string", json!(" ".repeat(size as usize)));
            }
        }
        "indentation" if text(pattern) == Some("tabs") => {
            set(rules, "pylint", "indent-string", json!("\t"));
        }
        "import_style" if text(pattern) == Some("absolute") => {
            set(rules, "flake8", "ban-relative-imports", json!(true));
        }
        "type_annotations" => match text(pattern) {
            Some("annotated") => set(rules, "mypy", "disallow_untyped_defs", json!(true)),
            Some("unannotated") => set(rules, "mypy", "disallow_untyped_defs", json!(false)),
            _ => {}
        },
        "docstring_format" => {
            let convention = match text(pattern) {
                Some("google") => Some("google"),
                Some("numpy") => Some("numpy"),
                Some("sphinx") | Some("plain") => Some("pep257"),
                _ => None,
            };
            if let Some(convention) = convention {
                set(rules, "pydocstyle", "convention", json!(convention));
            }
        }
        "high_documentation_coverage" => {
            set(rules, "pydocstyle", "add-select", json!("D101,D102,D103"));
        }
        _ => {}
    }
}

fn javascript_rule(rules: &mut CustomRules, language: &str, pattern: &Pattern) {
    match pattern.pattern_name.as_str() {
        "function_naming" | "variable_naming" => match naming_style(pattern) {
            Some(NamingStyle::CamelCase) => {
                set(rules, "eslint", "camelcase", json!(["error", { "properties": "never" }]));
            }
            Some(NamingStyle::SnakeCase) => set(rules, "eslint", "camelcase", json!("off")),
            _ => {}
        },
        "class_naming" if naming_style(pattern) == Some(NamingStyle::PascalCase) => {
            set(rules, "eslint", "new-cap", json!("error"));
        }
        "quote_style" => {
            if let Some(quote) = text(pattern) {
                set(rules, "eslint", "quotes", json!(["error", quote]));
                set(rules, "prettier", "singleQuote", json!(quote == "single"));
            }
        }
        "indentation" => match text(pattern) {
            Some("tabs") => {
                set(rules, "eslint", "indent", json!(["error", "tab"]));
                set(rules, "prettier", "useTabs", json!(true));
            }
            Some("spaces") => set(rules, "prettier", "useTabs", json!(false)),
            _ => {}
        },
        "indent_size" => {
            if let Some(size) = pattern.pattern_value.as_number() {
                set(rules, "eslint", "indent", json!(["error", size as u64]));
                set(rules, "prettier", "tabWidth", json!(size as u64));
            }
        }
        "import_style" if text(pattern) == Some("absolute") => {
            set(
                rules,
                "eslint",
                "no-restricted-imports",
                json!(["error", { "patterns": ["../*"] }]),
            );
        }
        "type_annotations" if language == "typescript" && text(pattern) == Some("annotated") => {
            set(
                rules,
                "eslint",
                "@typescript-eslint/explicit-function-return-type",
                json!("warn"),
            );
        }
        "high_documentation_coverage" => {
            set(rules, "eslint", "jsdoc/require-jsdoc", json!("warn"));
        }
        _ => {}
    }
}

fn go_rule(rules: &mut CustomRules, pattern: &Pattern) {
    match pattern.pattern_name.as_str() {
        "function_naming" | "class_naming" | "variable_naming" | "constant_naming" => {
            if matches!(
                naming_style(pattern),
                Some(NamingStyle::CamelCase) | Some(NamingStyle::PascalCase)
            ) {
                set(rules, "golangci-lint", "stylecheck.ST1003", json!(true));
            }
        }
        "indentation" if text(pattern) == Some("tabs") => {
            set(rules, "gofmt", "simplify", json!(true));
        }
        "docstring_format" if text(pattern) == Some("godoc") => {
            set(rules, "golangci-lint", "stylecheck.ST1020", json!(true));
        }
        "high_documentation_coverage" => {
            set(rules, "golangci-lint", "revive.exported", json!(true));
        }
        _ => {}
    }
}

fn rust_rule(rules: &mut CustomRules, pattern: &Pattern) {
    match pattern.pattern_name.as_str() {
        "function_naming" | "variable_naming"
            if naming_style(pattern) == Some(NamingStyle::SnakeCase) =>
        {
            set(rules, "rustc", "non_snake_case", json!("deny"));
        }
        "class_naming" if naming_style(pattern) == Some(NamingStyle::PascalCase) => {
            set(rules, "rustc", "non_camel_case_types", json!("deny"));
        }
        "constant_naming" if naming_style(pattern) == Some(NamingStyle::UpperSnakeCase) => {
            set(rules, "rustc", "non_upper_case_globals", json!("deny"));
        }
        "indentation" => match text(pattern) {
            Some("tabs") => set(rules, "rustfmt", "hard_tabs", json!(true)),
            Some("spaces") => set(rules, "rustfmt", "hard_tabs", json!(false)),
            _ => {}
        },
        "indent_size" => {
            if let Some(size) = pattern.pattern_value.as_number() {
                set(rules, "rustfmt", "tab_spaces", json!(size as u64));
            }
        }
        "import_style" if text(pattern) == Some("absolute") => {
            set(rules, "clippy", "wildcard_imports", json!("warn"));
        }
        "high_documentation_coverage" => {
            set(rules, "clippy", "missing_docs_in_private_items", json!("warn"));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternType, PatternValue};

    fn pattern(name: &str, value: PatternValue) -> Pattern {
        Pattern::new(PatternType::Style, name, value, 0.95, 10, vec![])
    }

    #[test]
    fn test_python_rules_from_patterns() {
        let patterns = vec![
            pattern("function_naming", PatternValue::Text("snake_case".into())),
            pattern("quote_style", PatternValue::Text("single".into())),
            pattern("indent_size", PatternValue::Number(4.0)),
            pattern("docstring_format", PatternValue::Text("google".into())),
        ];
        let rules = derive_rules("python", &patterns, &LineStats::default());

        assert_eq!(rules["pylint"]["function-naming-style"], json!("snake_case"));
        assert_eq!(rules["flake8"]["inline-quotes"], json!("single"));
        assert_eq!(rules["flake8"]["indent-size"], json!(4));
        assert_eq!(rules["pydocstyle"]["convention"], json!("google"));
        assert!(!rules["flake8"].contains_key("max-line-length"));
    }

    #[test]
    fn test_long_lines_widen_limit() {
        let stats = LineStats {
            lines: 10,
            total_length: 1100,
            max_length: 140,
        };
        let rules = derive_rules("python", &[], &stats);
        assert_eq!(rules["flake8"]["max-line-length"], json!(120));

        let rules = derive_rules("typescript", &[], &stats);
        assert_eq!(rules["prettier"]["printWidth"], json!(120));
    }

    #[test]
    fn test_javascript_quotes_and_tabs() {
        let patterns = vec![
            pattern("quote_style", PatternValue::Text("single".into())),
            pattern("indentation", PatternValue::Text("tabs".into())),
        ];
        let rules = derive_rules("javascript", &patterns, &LineStats::default());
        assert_eq!(rules["eslint"]["quotes"], json!(["error", "single"]));
        assert_eq!(rules["prettier"]["singleQuote"], json!(true));
        assert_eq!(rules["prettier"]["useTabs"], json!(true));
    }

    #[test]
    fn test_unknown_language_has_no_rules() {
        let patterns = vec![pattern("quote_style", PatternValue::Text("single".into()))];
        assert!(derive_rules("cobol", &patterns, &LineStats::default()).is_empty());
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(complexity_threshold(3.0), 5);
        assert_eq!(complexity_threshold(10.0), 12);
        assert_eq!(function_length_threshold(10.0), 20);
        assert_eq!(function_length_threshold(30.0), 45);

        let mut metrics = LanguageMetrics::empty("go");
        metrics.avg_complexity = 10.0;
        metrics.avg_function_size = 30.0;
        let rules = threshold_rules("go", &metrics);
        assert_eq!(rules["golangci-lint"]["gocyclo.min-complexity"], json!(12));
        assert_eq!(rules["golangci-lint"]["funlen.lines"], json!(45));
    }

    #[test]
    fn test_merge_rules_overwrites_keys() {
        let mut rules = CustomRules::new();
        set(&mut rules, "flake8", "max-complexity", json!(5));
        set(&mut rules, "flake8", "inline-quotes", json!("single"));
        let mut extra = CustomRules::new();
        set(&mut extra, "flake8", "max-complexity", json!(9));
        merge_rules(&mut rules, extra);
        assert_eq!(rules["flake8"]["max-complexity"], json!(9));
        assert_eq!(rules["flake8"]["inline-quotes"], json!("single"));
    }
}
