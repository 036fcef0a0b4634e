//! Cross-language pattern consistency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::LanguageMetrics;
use crate::learning::LearningResult;
use crate::patterns::{Pattern, PatternType, PatternValue};

/// Language key used for a primary result that does not name its language.
pub const PRIMARY_KEY: &str = "primary";

pub const AVG_COMPLEXITY: &str = "avg_complexity";
pub const AVG_FUNCTION_SIZE: &str = "avg_function_size";

/// Complexity at or below which a codebase counts as simple.
pub(crate) const GOOD_COMPLEXITY: f64 = 5.0;
/// Function length at or below which a codebase counts as compact.
pub(crate) const GOOD_FUNCTION_SIZE: f64 = 20.0;

/// How uniformly one pattern is applied across two or more languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossLanguagePattern {
    pub pattern_name: String,
    /// Sorted, at least two.
    pub languages: Vec<String>,
    pub values: BTreeMap<String, PatternValue>,
    /// Within [0, 1].
    pub consistency_score: f64,
    pub recommendation: String,
}

/// Pattern name to language to observed value.
pub type PatternIndex = BTreeMap<String, BTreeMap<String, PatternValue>>;

/// Index the primary result's patterns and every language's patterns by name.
///
/// Metrics entries overwrite the primary result for the same language.
/// Structure patterns are left out: every language sees the same layout.
pub fn index_patterns(
    primary: Option<&LearningResult>,
    metrics: &BTreeMap<String, LanguageMetrics>,
) -> PatternIndex {
    let mut index = PatternIndex::new();

    if let Some(result) = primary {
        let language = if result.language.is_empty() {
            PRIMARY_KEY
        } else {
            result.language.as_str()
        };
        for pattern in result.patterns.iter().filter(|p| is_per_language(p)) {
            index
                .entry(pattern.pattern_name.clone())
                .or_default()
                .insert(language.to_string(), pattern.pattern_value.clone());
        }
    }

    for (language, m) in metrics {
        for pattern in m.patterns.iter().filter(|p| is_per_language(p)) {
            index
                .entry(pattern.pattern_name.clone())
                .or_default()
                .insert(language.clone(), pattern.pattern_value.clone());
        }
    }

    index
}

fn is_per_language(pattern: &Pattern) -> bool {
    pattern.pattern_type != PatternType::Structure
}

/// Consistency of the values one pattern takes across languages.
///
/// Numbers use `max(0, 1 - rsd)`, flags must all agree, and anything else
/// (including a mix of value kinds) is categorical: 1.0 when all equal,
/// 0.5 otherwise.
pub fn value_consistency(values: &[&PatternValue]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }

    let numbers: Option<Vec<f64>> = values.iter().map(|v| v.as_number()).collect();
    if let Some(numbers) = numbers {
        return numeric_consistency(&numbers);
    }

    let all_equal = values.windows(2).all(|w| w[0] == w[1]);
    let all_flags = values.iter().all(|v| v.as_flag().is_some());
    match (all_equal, all_flags) {
        (true, _) => 1.0,
        (false, true) => 0.0,
        (false, false) => 0.5,
    }
}

/// `max(0, 1 - population_std / |mean|)`. With a zero mean: 1.0 when every
/// value is zero, else 0.0.
pub fn numeric_consistency(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return if values.iter().all(|v| *v == 0.0) { 1.0 } else { 0.0 };
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt() / mean.abs()).max(0.0)
}

/// `1 - (max - min) / max`; 1.0 when the maximum is zero.
pub fn spread_consistency(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    if values.is_empty() || max <= 0.0 {
        return 1.0;
    }
    (1.0 - (max - min) / max).clamp(0.0, 1.0)
}

pub fn recommendation_for(pattern_name: &str, consistency: f64) -> String {
    if consistency >= 0.8 {
        format!("Maintain the consistent {} across languages", pattern_name)
    } else if consistency >= 0.5 {
        format!(
            "Unify {} lightly: languages mostly agree but differ in places",
            pattern_name
        )
    } else {
        format!("Establish a cross-language standard for {}", pattern_name)
    }
}

/// Cross patterns for every indexed name seen in two or more languages.
pub fn cross_patterns(index: &PatternIndex) -> Vec<CrossLanguagePattern> {
    index
        .iter()
        .filter(|(_, values)| values.len() >= 2)
        .map(|(name, values)| {
            let observed: Vec<&PatternValue> = values.values().collect();
            let consistency = value_consistency(&observed);
            CrossLanguagePattern {
                pattern_name: name.clone(),
                languages: values.keys().cloned().collect(),
                values: values.clone(),
                consistency_score: consistency,
                recommendation: recommendation_for(name, consistency),
            }
        })
        .collect()
}

/// Complexity and function-size consistency across languages with data.
///
/// Empty unless at least two languages have files.
pub fn derived_patterns(metrics: &BTreeMap<String, LanguageMetrics>) -> Vec<CrossLanguagePattern> {
    let with_data: Vec<(&String, &LanguageMetrics)> =
        metrics.iter().filter(|(_, m)| m.has_data()).collect();
    if with_data.len() < 2 {
        return Vec::new();
    }

    vec![
        derived(
            AVG_COMPLEXITY,
            &with_data,
            |m| m.avg_complexity,
            GOOD_COMPLEXITY,
            "complexity",
        ),
        derived(
            AVG_FUNCTION_SIZE,
            &with_data,
            |m| m.avg_function_size,
            GOOD_FUNCTION_SIZE,
            "function size",
        ),
    ]
}

fn derived(
    name: &str,
    metrics: &[(&String, &LanguageMetrics)],
    measure: impl Fn(&LanguageMetrics) -> f64,
    good_limit: f64,
    label: &str,
) -> CrossLanguagePattern {
    let values: BTreeMap<String, PatternValue> = metrics
        .iter()
        .map(|(language, m)| ((*language).clone(), PatternValue::Number(measure(m))))
        .collect();
    let numbers: Vec<f64> = metrics.iter().map(|(_, m)| measure(m)).collect();
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
    let consistency = spread_consistency(&numbers);

    let recommendation = if consistency >= 0.8 && mean <= good_limit {
        format!(
            "Maintain the low {} (average {:.1}) shared across languages",
            label, mean
        )
    } else if consistency >= 0.8 {
        format!(
            "The {} is consistent but high (average {:.1}); reduce it in every language",
            label, mean
        )
    } else {
        format!(
            "The {} varies between languages; align on a common limit",
            label
        )
    };

    CrossLanguagePattern {
        pattern_name: name.to_string(),
        languages: values.keys().cloned().collect(),
        values,
        consistency_score: consistency,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{Pattern, PatternType};

    fn metrics_with(language: &str, complexity: f64, size: f64, naming: &str) -> LanguageMetrics {
        let mut m = LanguageMetrics::empty(language);
        m.file_count = 3;
        m.avg_complexity = complexity;
        m.avg_function_size = size;
        m.patterns.push(Pattern::new(
            PatternType::Naming,
            "function_naming",
            PatternValue::Text(naming.into()),
            0.95,
            10,
            vec![],
        ));
        m
    }

    #[test]
    fn test_single_language_has_no_cross_patterns() {
        let mut map = BTreeMap::new();
        map.insert("python".to_string(), metrics_with("python", 3.0, 10.0, "snake_case"));
        let index = index_patterns(None, &map);
        assert!(cross_patterns(&index).is_empty());
        assert!(derived_patterns(&map).is_empty());
    }

    #[test]
    fn test_identical_languages_are_fully_consistent() {
        let mut map = BTreeMap::new();
        map.insert("python".to_string(), metrics_with("python", 3.0, 10.0, "snake_case"));
        map.insert("rust".to_string(), metrics_with("rust", 3.0, 10.0, "snake_case"));

        let cross = cross_patterns(&index_patterns(None, &map));
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].consistency_score, 1.0);
        assert_eq!(cross[0].languages, vec!["python", "rust"]);

        let derived = derived_patterns(&map);
        assert_eq!(derived.len(), 2);
        for pattern in &derived {
            assert_eq!(pattern.consistency_score, 1.0);
            assert!(pattern.recommendation.starts_with("Maintain"));
        }
    }

    #[test]
    fn test_value_consistency_kinds() {
        let a = PatternValue::Text("snake_case".into());
        let b = PatternValue::Text("camelCase".into());
        assert_eq!(value_consistency(&[&a, &b]), 0.5);

        let t = PatternValue::Flag(true);
        let f = PatternValue::Flag(false);
        assert_eq!(value_consistency(&[&t, &f]), 0.0);
        assert_eq!(value_consistency(&[&t, &t]), 1.0);

        let n = PatternValue::Number(4.0);
        assert_eq!(value_consistency(&[&a, &n]), 0.5);
    }

    #[test]
    fn test_numeric_consistency() {
        assert_eq!(numeric_consistency(&[4.0, 4.0]), 1.0);
        assert_eq!(numeric_consistency(&[0.0, 0.0]), 1.0);
        assert_eq!(numeric_consistency(&[-1.0, 1.0]), 0.0);
        // mean 3, std 1
        assert!((numeric_consistency(&[2.0, 4.0]) - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_spread_consistency() {
        assert_eq!(spread_consistency(&[0.0, 0.0]), 1.0);
        assert_eq!(spread_consistency(&[5.0, 10.0]), 0.5);
    }

    #[test]
    fn test_recommendation_tiers() {
        assert!(recommendation_for("quote_style", 0.9).starts_with("Maintain"));
        assert!(recommendation_for("quote_style", 0.5).starts_with("Unify"));
        assert!(recommendation_for("quote_style", 0.2).starts_with("Establish"));
    }
}
