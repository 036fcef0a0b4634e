//! Project layout conventions.

use crate::analysis::{FeatureBag, TEST_DIRS};

use super::{dominant_pattern, AnalyzerSettings, Pattern, PatternType, PatternValue};

const DOC_DIRS: &[&str] = &["docs", "doc", "documentation"];
const SOURCE_DIRS: &[&str] = &["src", "lib", "source", "app", "pkg", "internal", "cmd"];
const SCRIPT_DIRS: &[&str] = &["scripts", "bin", "tools"];

/// Conventional top-level directory groups and the pattern each one sets.
pub(crate) const CONVENTIONAL_DIRS: &[(&str, &[&str])] = &[
    ("has_tests_directory", TEST_DIRS),
    ("has_docs_directory", DOC_DIRS),
    ("has_source_directory", SOURCE_DIRS),
    ("has_scripts_directory", SCRIPT_DIRS),
];

pub(super) fn analyze(bag: &FeatureBag, settings: &AnalyzerSettings) -> Vec<Pattern> {
    let layout = &bag.layout;
    let mut patterns = Vec::new();

    for (name, dirs) in CONVENTIONAL_DIRS {
        let found: Vec<String> = dirs
            .iter()
            .filter(|d| layout.top_level_dirs.contains(**d))
            .map(|d| d.to_string())
            .collect();
        if found.is_empty() {
            continue;
        }
        patterns.push(Pattern::new(
            PatternType::Structure,
            *name,
            PatternValue::Flag(true),
            1.0,
            found.len(),
            found,
        ));
    }

    if let Some(pattern) = dominant_pattern(
        PatternType::Structure,
        "dominant_language",
        &layout.source_files,
        settings,
        Vec::new(),
    ) {
        patterns.push(pattern);
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_flags_and_dominant_language() {
        let mut bag = FeatureBag::default();
        bag.layout.top_level_dirs.insert("tests".into());
        bag.layout.top_level_dirs.insert("src".into());
        bag.layout.source_files.add_n("python", 20);
        bag.layout.source_files.add_n("javascript", 1);

        let patterns = analyze(&bag, &AnalyzerSettings::default());
        let names: Vec<&str> = patterns.iter().map(|p| p.pattern_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["has_tests_directory", "has_source_directory", "dominant_language"]
        );
        assert_eq!(patterns[0].confidence, 1.0);
        assert_eq!(patterns[2].pattern_value, PatternValue::Text("python".into()));
    }

    #[test]
    fn test_empty_layout_yields_nothing() {
        assert!(analyze(&FeatureBag::default(), &AnalyzerSettings::default()).is_empty());
    }
}
