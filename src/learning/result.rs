//! The learned profile of one language.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::patterns::Pattern;

/// Lowest strictness a `LearningResult` may carry.
pub const MIN_STRICTNESS: f64 = 0.1;
/// Highest strictness any result may carry.
pub const MAX_STRICTNESS: f64 = 1.0;

/// Coarse classification of how established a project's practices are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    Beginner,
    Intermediate,
    Expert,
}

impl Maturity {
    /// Bucket a score in [0, 1]: ≥0.8 expert, ≥0.5 intermediate.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.8 {
            Maturity::Expert
        } else if ratio >= 0.5 {
            Maturity::Intermediate
        } else {
            Maturity::Beginner
        }
    }

    /// Starting strictness before confidence adjustments.
    pub fn base_strictness(&self) -> f64 {
        match self {
            Maturity::Beginner => 0.3,
            Maturity::Intermediate => 0.6,
            Maturity::Expert => 0.8,
        }
    }

    /// Score used when blending a bucket with numeric maturity scores.
    pub fn score_equivalent(&self) -> f64 {
        match self {
            Maturity::Beginner => 0.3,
            Maturity::Intermediate => 0.6,
            Maturity::Expert => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Maturity::Beginner => "beginner",
            Maturity::Intermediate => "intermediate",
            Maturity::Expert => "expert",
        }
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Setting name to value for one tool.
pub type RuleSet = BTreeMap<String, serde_json::Value>;

/// Tool name (`flake8`, `eslint`, ...) to its settings.
pub type CustomRules = BTreeMap<String, RuleSet>;

pub type TeamPreferences = BTreeMap<String, serde_json::Value>;

/// One language's learned conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResult {
    /// Language the profile was learned from. Empty in older snapshots.
    #[serde(default)]
    pub language: String,
    pub project_maturity: Maturity,
    /// Always within [`MIN_STRICTNESS`, `MAX_STRICTNESS`].
    pub recommended_strictness: f64,
    pub patterns: Vec<Pattern>,
    pub custom_rules: CustomRules,
    pub team_preferences: TeamPreferences,
    /// Seconds since the unix epoch.
    pub generated_at: f64,
}

impl LearningResult {
    /// Mean confidence of the accepted patterns; 0.5 when there are none.
    pub fn average_confidence(&self) -> f64 {
        average_confidence(&self.patterns)
    }

    pub fn find_pattern(&self, name: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.pattern_name == name)
    }
}

pub(crate) fn average_confidence(patterns: &[Pattern]) -> f64 {
    if patterns.is_empty() {
        return 0.5;
    }
    patterns.iter().map(|p| p.confidence).sum::<f64>() / patterns.len() as f64
}

/// Clamp into `[min, MAX_STRICTNESS]`.
pub(crate) fn clamp_strictness(value: f64, min: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, MAX_STRICTNESS)
}

/// Current unix time in (fractional) seconds.
pub(crate) fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maturity_buckets() {
        assert_eq!(Maturity::from_ratio(0.0), Maturity::Beginner);
        assert_eq!(Maturity::from_ratio(0.49), Maturity::Beginner);
        assert_eq!(Maturity::from_ratio(0.5), Maturity::Intermediate);
        assert_eq!(Maturity::from_ratio(0.8), Maturity::Expert);
        assert_eq!(Maturity::Expert.base_strictness(), 0.8);
        assert_eq!(Maturity::Expert.score_equivalent(), 0.9);
    }

    #[test]
    fn test_maturity_serializes_lowercase() {
        let json = serde_json::to_string(&Maturity::Intermediate).unwrap();
        assert_eq!(json, "\"intermediate\"");
    }

    #[test]
    fn test_clamp_strictness() {
        assert_eq!(clamp_strictness(-1.0, MIN_STRICTNESS), MIN_STRICTNESS);
        assert_eq!(clamp_strictness(2.0, MIN_STRICTNESS), MAX_STRICTNESS);
        assert_eq!(clamp_strictness(f64::NAN, 0.3), 0.3);
    }

    #[test]
    fn test_language_defaults_when_missing() {
        let json = r#"{
            "project_maturity": "beginner",
            "recommended_strictness": 0.3,
            "patterns": [],
            "custom_rules": {},
            "team_preferences": {},
            "generated_at": 1700000000.5
        }"#;
        let result: LearningResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.language, "");
        assert_eq!(result.average_confidence(), 0.5);
    }
}
