//! The learning engine: one language in, one [`LearningResult`] out.

use std::path::{Path, PathBuf};

use log::info;

use crate::analysis::{LanguageAnalysis, LanguageAnalyzer, ProjectLayout, Tally};
use crate::config::LearningConfig;
use crate::error::{LearnError, Result};

use super::maturity;
use super::preferences::infer_preferences;
use super::result::{
    average_confidence, clamp_strictness, unix_timestamp, LearningResult, MIN_STRICTNESS,
};
use super::rules::derive_rules;
use super::snapshot::SnapshotStore;

/// Language assumed when nothing else decides.
pub const FALLBACK_LANGUAGE: &str = "python";

/// Weight of the confidence adjustment applied to base strictness.
const CONFIDENCE_WEIGHT: f64 = 0.3;

/// Learns a project's conventions for its primary language.
#[derive(Debug, Clone, Default)]
pub struct LearningEngine {
    config: LearningConfig,
}

impl LearningEngine {
    pub fn new(config: LearningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Analyze `root` and learn its conventions.
    ///
    /// Idempotent: two runs over an unchanged tree agree on everything but
    /// `generated_at`.
    pub fn learn(&self, root: &Path) -> Result<LearningResult> {
        let (analysis, layout) = self.analyze_primary(root)?;
        Ok(self.learn_from_analysis(&analysis, &layout))
    }

    /// Scan the tree and run the primary language's analyzer.
    pub fn analyze_primary(&self, root: &Path) -> Result<(LanguageAnalysis, ProjectLayout)> {
        ensure_root(root)?;
        let options = self.config.scan_options()?;
        let layout = ProjectLayout::scan(root, &options);

        let language = self.primary_language(&layout);
        let analyzer = LanguageAnalyzer::for_language(&language)
            .ok_or_else(|| LearnError::UnknownLanguage(language.clone()))?;

        let analysis = if layout.source_files.get(&language) == 0 {
            info!("{}: no {} files, nothing to learn", root.display(), language);
            LanguageAnalysis::from_files(
                &language,
                Vec::new(),
                0,
                &layout,
                &self.config.analyzer_settings(),
            )
        } else {
            analyzer.analyze(root, &layout, &self.config)?
        };

        Ok((analysis, layout))
    }

    /// The configured primary language, else the active language with the
    /// most files, else [`FALLBACK_LANGUAGE`].
    pub fn primary_language(&self, layout: &ProjectLayout) -> String {
        if let Some(language) = &self.config.primary_language {
            return language.clone();
        }

        let active = self.config.active_languages();
        let candidates: Tally = layout
            .source_files
            .iter()
            .filter(|(language, _)| active.iter().any(|a| a.as_str() == *language))
            .fold(Tally::new(), |mut tally, (language, count)| {
                tally.add_n(language, count);
                tally
            });

        candidates
            .dominant()
            .map(|(language, _)| language.to_string())
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }

    /// Turn an analysis into a result: accept patterns, assess maturity,
    /// compute strictness, derive rules and preferences.
    pub fn learn_from_analysis(
        &self,
        analysis: &LanguageAnalysis,
        layout: &ProjectLayout,
    ) -> LearningResult {
        let patterns: Vec<_> = analysis
            .metrics
            .patterns
            .iter()
            .filter(|p| p.confidence >= self.config.min_pattern_confidence)
            .cloned()
            .collect();

        let (project_maturity, ratio) = maturity::assess(analysis, layout);
        let adjustment = (average_confidence(&patterns) - 0.5) * CONFIDENCE_WEIGHT;
        let recommended_strictness =
            clamp_strictness(project_maturity.base_strictness() + adjustment, MIN_STRICTNESS);

        let custom_rules =
            derive_rules(&analysis.language, &patterns, &analysis.metrics.line_stats);
        let team_preferences = infer_preferences(analysis);

        info!(
            "{}: maturity {} ({:.2}), strictness {:.2}, {} patterns",
            analysis.language,
            project_maturity,
            ratio,
            recommended_strictness,
            patterns.len()
        );

        LearningResult {
            language: analysis.language.clone(),
            project_maturity,
            recommended_strictness,
            patterns,
            custom_rules,
            team_preferences,
            generated_at: unix_timestamp(),
        }
    }

    /// Move `previous` strictness toward `fresh` by the adaptation rate.
    ///
    /// Everything else is taken from `fresh`.
    pub fn adapt(&self, previous: &LearningResult, fresh: LearningResult) -> LearningResult {
        let prev = previous.recommended_strictness;
        let blended = prev + self.config.adaptation_rate * (fresh.recommended_strictness - prev);
        LearningResult {
            recommended_strictness: clamp_strictness(blended, MIN_STRICTNESS),
            ..fresh
        }
    }

    fn store(&self, root: &Path) -> SnapshotStore {
        SnapshotStore::new(self.config.state_dir_for(root))
    }

    /// Persist `result` under the project's state directory.
    pub fn save(&self, root: &Path, result: &LearningResult) -> Result<PathBuf> {
        ensure_root(root)?;
        self.store(root).save(result)
    }

    /// Load the saved result for `root`.
    pub fn load(&self, root: &Path) -> Result<LearningResult> {
        self.store(root).load()
    }
}

/// Fail fast on a missing or non-directory root.
pub(crate) fn ensure_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(LearnError::RootNotFound(root.to_path_buf()));
    }
    Ok(())
}
