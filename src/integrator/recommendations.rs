//! Prose recommendations for an integrated result.

use std::collections::BTreeMap;

use crate::analysis::LanguageMetrics;
use crate::learning::LearningResult;

use super::cross::{CrossLanguagePattern, AVG_COMPLEXITY};
use super::language_score;

/// Below this average, naming or style consistency calls for a standard.
const STANDARD_THRESHOLD: f64 = 0.8;
/// Below this, complexity consistency gets its own call-out.
const COMPLEXITY_CALLOUT: f64 = 0.6;

pub fn build_recommendations(
    primary: Option<&LearningResult>,
    metrics: &BTreeMap<String, LanguageMetrics>,
    cross: &[CrossLanguagePattern],
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(result) = primary {
        out.push(primary_tier(result));
    }

    for (language, m) in metrics.iter().filter(|(_, m)| m.has_data()) {
        out.push(quality_tier(language, m));
    }

    cross_buckets(cross, &mut out);

    if let Some(complexity) = cross.iter().find(|c| c.pattern_name == AVG_COMPLEXITY) {
        if complexity.consistency_score < COMPLEXITY_CALLOUT {
            out.push(format!(
                "Complexity differs widely between {}; agree on one complexity limit",
                complexity.languages.join(", ")
            ));
        }
    }

    let with_data: Vec<&LanguageMetrics> = metrics.values().filter(|m| m.has_data()).collect();
    if !with_data.is_empty() {
        let n = with_data.len() as f64;
        let naming = with_data.iter().map(|m| m.naming_consistency).sum::<f64>() / n;
        let style = with_data.iter().map(|m| m.style_consistency).sum::<f64>() / n;
        if naming < STANDARD_THRESHOLD {
            out.push(format!(
                "Define a naming standard: identifiers follow their dominant style {:.0}% of the time",
                naming * 100.0
            ));
        }
        if style < STANDARD_THRESHOLD {
            out.push(format!(
                "Define a formatting standard: quotes and indentation agree {:.0}% of the time",
                style * 100.0
            ));
        }
    }

    out
}

fn primary_tier(result: &LearningResult) -> String {
    let language = if result.language.is_empty() {
        "the primary language"
    } else {
        result.language.as_str()
    };
    let confidence = result.average_confidence();

    if result.patterns.is_empty() {
        format!(
            "No {} conventions were learned with confidence; add more code before enforcing rules",
            language
        )
    } else if confidence >= 0.8 {
        format!(
            "High confidence in the learned {} conventions ({:.0}%); enforce them",
            language,
            confidence * 100.0
        )
    } else if confidence >= 0.6 {
        format!(
            "Moderate confidence in the learned {} conventions ({:.0}%); enforce them as warnings",
            language,
            confidence * 100.0
        )
    } else {
        format!(
            "Low confidence in the learned {} conventions ({:.0}%); review them before enforcing",
            language,
            confidence * 100.0
        )
    }
}

fn quality_tier(language: &str, metrics: &LanguageMetrics) -> String {
    let score = language_score(metrics);
    if score >= 0.8 {
        format!("{}: high quality ({:.2}); keep current standards", language, score)
    } else if score >= 0.6 {
        format!("{}: good quality ({:.2}) with room to improve", language, score)
    } else {
        format!(
            "{}: needs attention ({:.2}); complexity {:.1}, function size {:.1}",
            language, score, metrics.avg_complexity, metrics.avg_function_size
        )
    }
}

fn cross_buckets(cross: &[CrossLanguagePattern], out: &mut Vec<String>) {
    let names = |pred: &dyn Fn(f64) -> bool| -> Vec<&str> {
        cross
            .iter()
            .filter(|c| pred(c.consistency_score))
            .map(|c| c.pattern_name.as_str())
            .collect()
    };

    let strong = names(&|s| s >= 0.8);
    let moderate = names(&|s| (0.5..0.8).contains(&s));
    let weak = names(&|s| s < 0.5);

    if !strong.is_empty() {
        out.push(format!(
            "{} conventions are shared across languages: {}",
            strong.len(),
            strong.join(", ")
        ));
    }
    if !moderate.is_empty() {
        out.push(format!("Align partially shared conventions: {}", moderate.join(", ")));
    }
    if !weak.is_empty() {
        out.push(format!(
            "Establish cross-language standards for: {}",
            weak.join(", ")
        ));
    }
}
