//! Pattern learning integration.
//!
//! Merges the primary [`LearningResult`] with every language's metrics into
//! one [`IntegratedLearningResult`]: cross-language consistency, a unified
//! maturity and strictness, per-language rule sets and recommendations.

mod cross;
mod recommendations;

pub use cross::{
    cross_patterns, derived_patterns, index_patterns, numeric_consistency, recommendation_for,
    spread_consistency, value_consistency, CrossLanguagePattern, PatternIndex, AVG_COMPLEXITY,
    AVG_FUNCTION_SIZE, PRIMARY_KEY,
};
pub use recommendations::build_recommendations;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::LanguageMetrics;
use crate::config::LearningConfig;
use crate::error::Result;
use crate::learning::{
    check_learning_result, check_range, clamp_strictness, derive_rules, ensure_root, merge_rules,
    threshold_rules, unix_timestamp, CustomRules, LearningEngine, LearningResult, Maturity,
    Snapshot, SnapshotStore, MAX_STRICTNESS,
};
use crate::multi_language::{language_metrics, MultiLanguageManager};

use cross::{GOOD_COMPLEXITY, GOOD_FUNCTION_SIZE};

/// Lowest unified strictness.
pub const MIN_UNIFIED_STRICTNESS: f64 = 0.3;

/// Patterns must exceed this confidence to become per-language rules.
const RULE_CONFIDENCE: f64 = 0.7;

/// The merged, multi-language view of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedLearningResult {
    pub primary_result: Option<LearningResult>,
    pub language_metrics: BTreeMap<String, LanguageMetrics>,
    pub cross_language_patterns: Vec<CrossLanguagePattern>,
    pub recommendations: Vec<String>,
    pub overall_maturity: Maturity,
    /// Always within [`MIN_UNIFIED_STRICTNESS`, 1.0].
    pub overall_strictness: f64,
    pub language_rules: BTreeMap<String, CustomRules>,
    pub generated_at: f64,
}

impl Snapshot for IntegratedLearningResult {
    const FILE_NAME: &'static str = "integrated_learning_result.json";

    fn check(&self) -> std::result::Result<(), String> {
        check_range(
            "overall_strictness",
            self.overall_strictness,
            MIN_UNIFIED_STRICTNESS,
            MAX_STRICTNESS,
        )?;
        if let Some(primary) = &self.primary_result {
            check_learning_result(primary)?;
        }
        for (language, m) in &self.language_metrics {
            check_range(
                &format!("{} naming_consistency", language),
                m.naming_consistency,
                0.0,
                1.0,
            )?;
            check_range(
                &format!("{} style_consistency", language),
                m.style_consistency,
                0.0,
                1.0,
            )?;
        }
        for pattern in &self.cross_language_patterns {
            check_range(
                &format!("consistency of {}", pattern.pattern_name),
                pattern.consistency_score,
                0.0,
                1.0,
            )?;
        }
        Ok(())
    }
}

/// 1.0 up to an average complexity of 5, then down by 0.1 per point.
pub fn complexity_goodness(avg_complexity: f64) -> f64 {
    if avg_complexity <= GOOD_COMPLEXITY {
        1.0
    } else {
        (1.0 - (avg_complexity - GOOD_COMPLEXITY) / 10.0).max(0.0)
    }
}

/// 1.0 up to 20 lines per function, then down to 0 at 60.
pub fn size_goodness(avg_function_size: f64) -> f64 {
    if avg_function_size <= GOOD_FUNCTION_SIZE {
        1.0
    } else {
        (1.0 - (avg_function_size - GOOD_FUNCTION_SIZE) / 40.0).max(0.0)
    }
}

/// Per-language maturity score in [0, 1].
pub fn language_score(metrics: &LanguageMetrics) -> f64 {
    0.3 * metrics.naming_consistency
        + 0.2 * metrics.style_consistency
        + 0.3 * complexity_goodness(metrics.avg_complexity)
        + 0.2 * size_goodness(metrics.avg_function_size)
}

/// Merges per-language learning into one project view.
#[derive(Debug, Clone, Default)]
pub struct PatternLearningIntegrator {
    config: LearningConfig,
}

impl PatternLearningIntegrator {
    pub fn new(config: LearningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Analyze every language, learn the primary one, and integrate.
    ///
    /// The tree is scanned once; the primary result reuses that language's
    /// analysis when the manager produced one.
    pub fn run(&self, root: &Path) -> Result<IntegratedLearningResult> {
        let engine = LearningEngine::new(self.config.clone());
        let manager = MultiLanguageManager::new(self.config.clone());
        let (layout, analyses) = manager.analyze_detailed(root)?;

        let language = engine.primary_language(&layout);
        let primary = match analyses.get(&language) {
            Some(analysis) => engine.learn_from_analysis(analysis, &layout),
            None => engine.learn(root)?,
        };
        Ok(self.integrate(Some(primary), language_metrics(analyses)))
    }

    pub fn integrate(
        &self,
        primary: Option<LearningResult>,
        language_metrics: BTreeMap<String, LanguageMetrics>,
    ) -> IntegratedLearningResult {
        let with_data: BTreeMap<String, LanguageMetrics> = language_metrics
            .iter()
            .filter(|(_, m)| m.has_data())
            .map(|(k, m)| (k.clone(), m.clone()))
            .collect();

        let index = index_patterns(primary.as_ref(), &with_data);
        let mut cross = cross_patterns(&index);
        cross.extend(derived_patterns(&with_data));

        let overall_maturity = overall_maturity(primary.as_ref(), &with_data);
        let overall_strictness = unified_strictness(overall_maturity, &with_data);
        let language_rules = language_rules(primary.as_ref(), &with_data);
        let recommendations = build_recommendations(primary.as_ref(), &with_data, &cross);

        info!(
            "integrated {} languages: maturity {}, strictness {:.2}, {} cross-language patterns",
            with_data.len(),
            overall_maturity,
            overall_strictness,
            cross.len()
        );

        IntegratedLearningResult {
            primary_result: primary,
            language_metrics,
            cross_language_patterns: cross,
            recommendations,
            overall_maturity,
            overall_strictness,
            language_rules,
            generated_at: unix_timestamp(),
        }
    }

    fn store(&self, root: &Path) -> SnapshotStore {
        SnapshotStore::new(self.config.state_dir_for(root))
    }

    pub fn save(&self, root: &Path, result: &IntegratedLearningResult) -> Result<PathBuf> {
        ensure_root(root)?;
        self.store(root).save(result)
    }

    pub fn load(&self, root: &Path) -> Result<IntegratedLearningResult> {
        self.store(root).load()
    }
}

/// Mean of the primary bucket's score and the mean language score,
/// re-bucketed. Languages without files do not count.
fn overall_maturity(
    primary: Option<&LearningResult>,
    metrics: &BTreeMap<String, LanguageMetrics>,
) -> Maturity {
    let mut parts = Vec::with_capacity(2);
    if let Some(result) = primary {
        parts.push(result.project_maturity.score_equivalent());
    }
    if !metrics.is_empty() {
        let total: f64 = metrics.values().map(language_score).sum();
        parts.push(total / metrics.len() as f64);
    }
    if parts.is_empty() {
        return Maturity::Beginner;
    }
    Maturity::from_ratio(parts.iter().sum::<f64>() / parts.len() as f64)
}

fn unified_strictness(maturity: Maturity, metrics: &BTreeMap<String, LanguageMetrics>) -> f64 {
    let mut strictness = maturity.base_strictness();
    if !metrics.is_empty() {
        let naming = metrics.values().map(|m| m.naming_consistency).sum::<f64>()
            / metrics.len() as f64;
        if naming >= 0.8 {
            strictness += 0.05;
        } else if naming < 0.5 {
            strictness -= 0.1;
        }
    }
    clamp_strictness(strictness, MIN_UNIFIED_STRICTNESS)
}

fn language_rules(
    primary: Option<&LearningResult>,
    metrics: &BTreeMap<String, LanguageMetrics>,
) -> BTreeMap<String, CustomRules> {
    let mut all = BTreeMap::new();

    for (language, m) in metrics {
        let confident: Vec<_> = m
            .patterns
            .iter()
            .filter(|p| p.confidence > RULE_CONFIDENCE)
            .cloned()
            .collect();

        let mut rules = CustomRules::new();
        if let Some(result) = primary.filter(|r| &r.language == language) {
            merge_rules(&mut rules, result.custom_rules.clone());
        }
        merge_rules(
            &mut rules,
            derive_rules(language, &confident, &m.line_stats),
        );
        merge_rules(&mut rules, threshold_rules(language, m));
        all.insert(language.clone(), rules);
    }

    all
}
