//! Pattern analyzers.
//!
//! Each analyzer is a pure function from a merged [`FeatureBag`] to a list of
//! scored [`Pattern`] records. The set of analyzers is closed, so they are
//! modelled as the variants of [`PatternAnalyzer`] rather than trait objects.

mod documentation;
mod naming;
mod structure;
mod style;

pub use documentation::HIGH_COVERAGE_THRESHOLD;
pub use naming::{naming_tallies, NamingStyle};
pub(crate) use structure::CONVENTIONAL_DIRS;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::{FeatureBag, Tally};

/// Maximum number of examples kept on a pattern.
pub const MAX_EXAMPLES: usize = 5;

/// Default per-analyzer confidence floor.
pub const DEFAULT_ANALYZER_FLOOR: f64 = 0.6;

/// Default steepness `k` of the share-to-confidence sigmoid.
///
/// The textbook curve uses `k = 5`, which scores a 90/10 split at 0.88. At 10
/// a 90/10 split clears 0.9. Set `confidence_steepness` to 5 for the gentler
/// curve.
pub const DEFAULT_STEEPNESS: f64 = 10.0;

/// The family a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Naming,
    Structure,
    Style,
    Documentation,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternType::Naming => "naming",
            PatternType::Structure => "structure",
            PatternType::Style => "style",
            PatternType::Documentation => "documentation",
        };
        write!(f, "{}", s)
    }
}

/// Observed value of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl PatternValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PatternValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PatternValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PatternValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PatternValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternValue::Flag(b) => write!(f, "{}", b),
            PatternValue::Number(n) => write!(f, "{}", n),
            PatternValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One observed convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_type: PatternType,
    pub pattern_name: String,
    pub pattern_value: PatternValue,
    /// Always within [0, 1].
    pub confidence: f64,
    pub frequency: usize,
    /// Up to [`MAX_EXAMPLES`] sample occurrences.
    pub examples: Vec<String>,
}

impl Pattern {
    /// Create a pattern, clamping confidence and truncating examples.
    pub fn new(
        pattern_type: PatternType,
        pattern_name: impl Into<String>,
        pattern_value: PatternValue,
        confidence: f64,
        frequency: usize,
        mut examples: Vec<String>,
    ) -> Self {
        examples.truncate(MAX_EXAMPLES);
        Self {
            pattern_type,
            pattern_name: pattern_name.into(),
            pattern_value,
            confidence: clamp_unit(confidence),
            frequency,
            examples,
        }
    }
}

/// Tunables shared by every analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerSettings {
    /// Patterns below this confidence (or whose dominant share does not
    /// exceed it) are dropped.
    pub confidence_floor: f64,
    /// Steepness `k` in `sigmoid(k * (share - 0.5))`.
    pub steepness: f64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            confidence_floor: DEFAULT_ANALYZER_FLOOR,
            steepness: DEFAULT_STEEPNESS,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Confidence that `count` of `total` observations form a convention.
///
/// `sigmoid(k * (share - 0.5))`: 0.5 at an even split, approaching 1 as the
/// share nears unanimity. Returns 0 for an empty sample. `k` defaults to
/// [`DEFAULT_STEEPNESS`] (10) rather than the more common 5.
pub fn share_confidence(count: usize, total: usize, steepness: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let share = count as f64 / total as f64;
    clamp_unit(1.0 / (1.0 + (-steepness * (share - 0.5)).exp()))
}

/// Share of the most common label; 0 for an empty tally.
pub fn consistency(tally: &Tally) -> f64 {
    let total = tally.total();
    match tally.dominant() {
        Some((_, count)) if total > 0 => count as f64 / total as f64,
        _ => 0.0,
    }
}

/// Emit a categorical pattern for the dominant label of `tally`, if its
/// share exceeds the floor and its confidence reaches it.
pub(crate) fn dominant_pattern(
    pattern_type: PatternType,
    name: &str,
    tally: &Tally,
    settings: &AnalyzerSettings,
    examples: Vec<String>,
) -> Option<Pattern> {
    let (label, count) = tally.dominant()?;
    let total = tally.total();
    let share = count as f64 / total as f64;
    if share <= settings.confidence_floor {
        return None;
    }
    let confidence = share_confidence(count, total, settings.steepness);
    if confidence < settings.confidence_floor {
        return None;
    }
    Some(Pattern::new(
        pattern_type,
        name,
        PatternValue::Text(label.to_string()),
        confidence,
        count,
        examples,
    ))
}

/// The closed set of pattern analyzers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternAnalyzer {
    Naming,
    Structure,
    Style,
    Documentation,
}

impl PatternAnalyzer {
    pub const ALL: [PatternAnalyzer; 4] = [
        PatternAnalyzer::Naming,
        PatternAnalyzer::Structure,
        PatternAnalyzer::Style,
        PatternAnalyzer::Documentation,
    ];

    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternAnalyzer::Naming => PatternType::Naming,
            PatternAnalyzer::Structure => PatternType::Structure,
            PatternAnalyzer::Style => PatternType::Style,
            PatternAnalyzer::Documentation => PatternType::Documentation,
        }
    }

    /// Run this analyzer over a feature bag.
    pub fn analyze(&self, bag: &FeatureBag, settings: &AnalyzerSettings) -> Vec<Pattern> {
        let patterns = match self {
            PatternAnalyzer::Naming => naming::analyze(bag, settings),
            PatternAnalyzer::Structure => structure::analyze(bag, settings),
            PatternAnalyzer::Style => style::analyze(bag, settings),
            PatternAnalyzer::Documentation => documentation::analyze(bag, settings),
        };
        patterns
            .into_iter()
            .filter(|p| p.confidence >= settings.confidence_floor)
            .collect()
    }

    /// Run every analyzer, concatenating results in analyzer order.
    pub fn analyze_all(bag: &FeatureBag, settings: &AnalyzerSettings) -> Vec<Pattern> {
        Self::ALL
            .iter()
            .flat_map(|analyzer| analyzer.analyze(bag, settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_confidence_bounds_and_monotonicity() {
        assert_eq!(share_confidence(0, 0, DEFAULT_STEEPNESS), 0.0);
        assert!((share_confidence(5, 10, DEFAULT_STEEPNESS) - 0.5).abs() < 1e-9);

        let mut previous = 0.0;
        for count in 50..=100 {
            let c = share_confidence(count, 100, DEFAULT_STEEPNESS);
            assert!((0.0..=1.0).contains(&c));
            assert!(c >= previous);
            previous = c;
        }
        assert!(share_confidence(90, 100, DEFAULT_STEEPNESS) > 0.9);
    }

    #[test]
    fn test_steepness_is_configurable() {
        let mut tally = Tally::new();
        tally.add_n("snake_case", 90);
        tally.add_n("camelCase", 10);

        let gentle = AnalyzerSettings {
            steepness: 5.0,
            ..Default::default()
        };
        let p = dominant_pattern(PatternType::Naming, "n", &tally, &gentle, vec![]).unwrap();
        // sigmoid(2)
        assert!((p.confidence - 0.8808).abs() < 1e-3);

        let p = dominant_pattern(
            PatternType::Naming,
            "n",
            &tally,
            &AnalyzerSettings::default(),
            vec![],
        )
        .unwrap();
        assert!(p.confidence > 0.9);
    }

    #[test]
    fn test_pattern_new_clamps_and_truncates() {
        let examples = (0..8).map(|i| i.to_string()).collect();
        let p = Pattern::new(
            PatternType::Style,
            "quote_style",
            PatternValue::Text("single".into()),
            1.7,
            3,
            examples,
        );
        assert_eq!(p.confidence, 1.0);
        assert_eq!(p.examples.len(), MAX_EXAMPLES);
    }

    #[test]
    fn test_dominant_pattern_respects_floor() {
        let settings = AnalyzerSettings::default();
        let even: Tally = ["single", "double"].into_iter().collect();
        assert!(dominant_pattern(PatternType::Style, "q", &even, &settings, vec![]).is_none());

        let mut clear = Tally::new();
        clear.add_n("single", 9);
        clear.add_n("double", 1);
        let p = dominant_pattern(PatternType::Style, "q", &clear, &settings, vec![]).unwrap();
        assert_eq!(p.pattern_value, PatternValue::Text("single".into()));
        assert_eq!(p.frequency, 9);
    }

    #[test]
    fn test_pattern_value_json_is_untagged() {
        let values = vec![
            PatternValue::Flag(true),
            PatternValue::Number(4.0),
            PatternValue::Text("snake_case".into()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,4.0,"snake_case"]"#);
        let back: Vec<PatternValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_consistency() {
        assert_eq!(consistency(&Tally::new()), 0.0);
        let tally: Tally = ["a", "a", "a", "b"].into_iter().collect();
        assert!((consistency(&tally) - 0.75).abs() < 1e-9);
    }
}
