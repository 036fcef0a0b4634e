//! Formatting and code style conventions.

use crate::analysis::FeatureBag;

use super::{dominant_pattern, AnalyzerSettings, Pattern, PatternType, PatternValue};

pub(super) fn analyze(bag: &FeatureBag, settings: &AnalyzerSettings) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    let quotes = bag.quotes.as_tally();
    patterns.extend(dominant_pattern(
        PatternType::Style,
        "quote_style",
        &quotes,
        settings,
        Vec::new(),
    ));

    let indentation = bag.indentation.as_tally();
    let indent_pattern = dominant_pattern(
        PatternType::Style,
        "indentation",
        &indentation,
        settings,
        Vec::new(),
    );
    let uses_spaces = indent_pattern
        .as_ref()
        .map(|p| p.pattern_value.as_text() == Some("spaces"))
        .unwrap_or(false);
    patterns.extend(indent_pattern);

    // Step width only means something for space indentation.
    if uses_spaces {
        if let Some(step) = dominant_pattern(
            PatternType::Style,
            "indent_size",
            &bag.indentation.steps,
            settings,
            Vec::new(),
        ) {
            let width = step
                .pattern_value
                .as_text()
                .and_then(|s| s.parse::<f64>().ok());
            if let Some(width) = width {
                patterns.push(Pattern {
                    pattern_value: PatternValue::Number(width),
                    ..step
                });
            }
        }
    }

    patterns.extend(dominant_pattern(
        PatternType::Style,
        "type_annotations",
        &bag.annotations,
        settings,
        Vec::new(),
    ));

    patterns.extend(dominant_pattern(
        PatternType::Style,
        "import_style",
        &bag.import_styles,
        settings,
        Vec::new(),
    ));

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(patterns: &'a [Pattern], name: &str) -> Option<&'a Pattern> {
        patterns.iter().find(|p| p.pattern_name == name)
    }

    #[test]
    fn test_quotes_indentation_and_step() {
        let mut bag = FeatureBag::default();
        bag.quotes.single = 2;
        bag.quotes.double = 38;
        bag.indentation.space_lines = 100;
        bag.indentation.steps.add_n("4", 30);
        bag.indentation.steps.add_n("8", 2);

        let patterns = analyze(&bag, &AnalyzerSettings::default());
        assert_eq!(
            find(&patterns, "quote_style").unwrap().pattern_value,
            PatternValue::Text("double".into())
        );
        assert_eq!(
            find(&patterns, "indentation").unwrap().pattern_value,
            PatternValue::Text("spaces".into())
        );
        assert_eq!(
            find(&patterns, "indent_size").unwrap().pattern_value,
            PatternValue::Number(4.0)
        );
    }

    #[test]
    fn test_tabs_have_no_indent_size() {
        let mut bag = FeatureBag::default();
        bag.indentation.tab_lines = 50;
        bag.indentation.steps.add_n("2", 1);

        let patterns = analyze(&bag, &AnalyzerSettings::default());
        assert!(find(&patterns, "indentation").is_some());
        assert!(find(&patterns, "indent_size").is_none());
    }

    #[test]
    fn test_annotations_and_imports() {
        let mut bag = FeatureBag::default();
        bag.annotations.add_n("annotated", 19);
        bag.annotations.add_n("unannotated", 1);
        bag.import_styles.add_n("absolute", 5);
        bag.import_styles.add_n("relative", 5);

        let patterns = analyze(&bag, &AnalyzerSettings::default());
        assert!(find(&patterns, "type_annotations").is_some());
        assert!(find(&patterns, "import_style").is_none());
    }
}
