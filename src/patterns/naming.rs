//! Identifier naming conventions.

use std::collections::BTreeMap;
use std::fmt;

use crate::analysis::{FeatureBag, IdentifierKind, Tally};

use super::{dominant_pattern, AnalyzerSettings, Pattern, PatternType};

/// Naming style of a single identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamingStyle {
    SnakeCase,
    CamelCase,
    PascalCase,
    KebabCase,
    UpperSnakeCase,
}

impl NamingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStyle::SnakeCase => "snake_case",
            NamingStyle::CamelCase => "camelCase",
            NamingStyle::PascalCase => "PascalCase",
            NamingStyle::KebabCase => "kebab-case",
            NamingStyle::UpperSnakeCase => "UPPER_SNAKE_CASE",
        }
    }

    pub const ALL: [NamingStyle; 5] = [
        NamingStyle::SnakeCase,
        NamingStyle::CamelCase,
        NamingStyle::PascalCase,
        NamingStyle::KebabCase,
        NamingStyle::UpperSnakeCase,
    ];

    /// Inverse of [`NamingStyle::as_str`].
    pub fn from_label(label: &str) -> Option<NamingStyle> {
        Self::ALL.into_iter().find(|style| style.as_str() == label)
    }

    /// Classify an identifier.
    ///
    /// Leading and trailing `_`, `$` and `#` are ignored (`__init__`,
    /// `_private`, `#field`). A single lowercase word fits both snake_case
    /// and camelCase, so it is left unclassified, as is anything mixing
    /// separators.
    pub fn classify(name: &str) -> Option<NamingStyle> {
        let core = name.trim_matches(|c| c == '_' || c == '$' || c == '#');
        let first = core.chars().next()?;
        if !first.is_ascii_alphabetic() {
            return None;
        }
        if !core.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return None;
        }

        let has_upper = core.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = core.chars().any(|c| c.is_ascii_lowercase());
        let has_underscore = core.contains('_');

        if core.contains('-') {
            return (!has_upper && !has_underscore).then_some(NamingStyle::KebabCase);
        }
        if has_upper && !has_lower {
            return (core.len() >= 2 || has_underscore).then_some(NamingStyle::UpperSnakeCase);
        }
        if first.is_ascii_lowercase() {
            return match (has_upper, has_underscore) {
                (false, true) => Some(NamingStyle::SnakeCase),
                (true, false) => Some(NamingStyle::CamelCase),
                _ => None,
            };
        }
        (!has_underscore).then_some(NamingStyle::PascalCase)
    }
}

impl fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tally of classified naming styles for a list of names.
pub fn style_tally(names: &[String]) -> Tally {
    names
        .iter()
        .filter_map(|n| NamingStyle::classify(n))
        .map(|style| style.as_str())
        .collect()
}

/// Style tallies for every identifier category.
pub fn naming_tallies(bag: &FeatureBag) -> BTreeMap<IdentifierKind, Tally> {
    IdentifierKind::ALL
        .iter()
        .map(|kind| (*kind, style_tally(bag.identifiers.get(*kind))))
        .collect()
}

pub(super) fn analyze(bag: &FeatureBag, settings: &AnalyzerSettings) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    for kind in IdentifierKind::ALL {
        let names = bag.identifiers.get(kind);
        let tally = style_tally(names);
        let Some((dominant, _)) = tally.dominant() else {
            continue;
        };

        let mut examples: Vec<String> = Vec::new();
        for name in names {
            let matches = NamingStyle::classify(name).map(|s| s.as_str()) == Some(dominant);
            if matches && !examples.contains(name) {
                examples.push(name.clone());
                if examples.len() == super::MAX_EXAMPLES {
                    break;
                }
            }
        }

        if let Some(pattern) = dominant_pattern(
            PatternType::Naming,
            kind.pattern_name(),
            &tally,
            settings,
            examples,
        ) {
            patterns.push(pattern);
        }
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternValue;

    #[test]
    fn test_classify() {
        assert_eq!(NamingStyle::classify("user_name"), Some(NamingStyle::SnakeCase));
        assert_eq!(NamingStyle::classify("_private_helper"), Some(NamingStyle::SnakeCase));
        assert_eq!(NamingStyle::classify("userName"), Some(NamingStyle::CamelCase));
        assert_eq!(NamingStyle::classify("UserName"), Some(NamingStyle::PascalCase));
        assert_eq!(NamingStyle::classify("User"), Some(NamingStyle::PascalCase));
        assert_eq!(NamingStyle::classify("MAX_SIZE"), Some(NamingStyle::UpperSnakeCase));
        assert_eq!(NamingStyle::classify("URL"), Some(NamingStyle::UpperSnakeCase));
        assert_eq!(NamingStyle::classify("user-card"), Some(NamingStyle::KebabCase));
        assert_eq!(NamingStyle::classify("__init__"), None);
        assert_eq!(NamingStyle::classify("render"), None);
        assert_eq!(NamingStyle::classify("Mixed_Case"), None);
        assert_eq!(NamingStyle::classify("T"), None);
        assert_eq!(NamingStyle::classify("404"), None);
    }

    #[test]
    fn test_ninety_ten_split_yields_snake_case() {
        let mut bag = FeatureBag::default();
        for i in 0..90 {
            bag.identifiers.functions.push(format!("load_item_{}", i));
        }
        for i in 0..10 {
            bag.identifiers.functions.push(format!("loadItem{}", i));
        }

        let patterns = analyze(&bag, &AnalyzerSettings::default());
        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.pattern_type, PatternType::Naming);
        assert_eq!(p.pattern_name, "function_naming");
        assert_eq!(p.pattern_value, PatternValue::Text("snake_case".into()));
        assert_eq!(p.frequency, 90);
        assert!(p.confidence > 0.9);
        assert_eq!(p.examples.len(), 5);
    }

    #[test]
    fn test_even_split_yields_nothing() {
        let mut bag = FeatureBag::default();
        bag.identifiers.variables = vec!["a_b".into(), "aB".into(), "c_d".into(), "cD".into()];
        assert!(analyze(&bag, &AnalyzerSettings::default()).is_empty());
    }
}
