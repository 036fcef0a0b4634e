//! Documentation habits.

use crate::analysis::FeatureBag;

use super::{dominant_pattern, AnalyzerSettings, Pattern, PatternType, PatternValue};

/// Coverage above which documentation counts as a project habit.
pub const HIGH_COVERAGE_THRESHOLD: f64 = 0.7;

pub(super) fn analyze(bag: &FeatureBag, settings: &AnalyzerSettings) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    patterns.extend(dominant_pattern(
        PatternType::Documentation,
        "doc_comment_style",
        &bag.doc_delimiters,
        settings,
        Vec::new(),
    ));

    patterns.extend(dominant_pattern(
        PatternType::Documentation,
        "docstring_format",
        &bag.doc_formats,
        settings,
        Vec::new(),
    ));

    if let Some(coverage) = bag.documentation_coverage() {
        if coverage > HIGH_COVERAGE_THRESHOLD {
            patterns.push(Pattern::new(
                PatternType::Documentation,
                "high_documentation_coverage",
                PatternValue::Flag(true),
                coverage,
                bag.documented_items,
                Vec::new(),
            ));
        }
    }

    patterns
}
