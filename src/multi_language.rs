//! Running every language analyzer over one tree.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::analysis::{LanguageAnalysis, LanguageAnalyzer, LanguageMetrics, ProjectLayout};
use crate::config::LearningConfig;
use crate::error::Result;
use crate::learning::ensure_root;

/// Runs a set of language analyzers and collects their metrics.
#[derive(Debug, Clone)]
pub struct MultiLanguageManager {
    config: LearningConfig,
    analyzers: Vec<LanguageAnalyzer>,
}

impl MultiLanguageManager {
    /// Manager for the configured languages (all registered ones by default).
    ///
    /// Unknown language ids are skipped with a warning.
    pub fn new(config: LearningConfig) -> Self {
        let analyzers = config
            .active_languages()
            .iter()
            .filter_map(|language| {
                let analyzer = LanguageAnalyzer::for_language(language);
                if analyzer.is_none() {
                    warn!("no analyzer registered for language '{}'", language);
                }
                analyzer
            })
            .collect();
        Self { config, analyzers }
    }

    pub fn with_analyzers(config: LearningConfig, analyzers: Vec<LanguageAnalyzer>) -> Self {
        Self { config, analyzers }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn languages(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.language_id()).collect()
    }

    /// Per-language metrics for every language with at least one file.
    ///
    /// A language whose analyzer fails is logged and left out. Structure
    /// patterns are dropped since they describe the project, not a language.
    pub fn analyze(&self, root: &Path) -> Result<BTreeMap<String, LanguageMetrics>> {
        let (_, analyses) = self.analyze_detailed(root)?;
        Ok(language_metrics(analyses))
    }

    /// Like [`analyze`](Self::analyze), keeping the full per-language
    /// analyses and the scanned layout.
    pub fn analyze_detailed(
        &self,
        root: &Path,
    ) -> Result<(ProjectLayout, BTreeMap<String, LanguageAnalysis>)> {
        ensure_root(root)?;
        let options = self.config.scan_options()?;
        let layout = ProjectLayout::scan(root, &options);

        let mut analyses = BTreeMap::new();
        for analyzer in &self.analyzers {
            let language = analyzer.language_id();
            if layout.source_files.get(language) == 0 {
                debug!("{}: no files, skipping", language);
                continue;
            }

            match analyzer.analyze(root, &layout, &self.config) {
                Ok(analysis) if analysis.metrics.has_data() => {
                    analyses.insert(language.to_string(), analysis);
                }
                Ok(_) => debug!("{}: every file was skipped", language),
                Err(e) => warn!("{} analysis failed: {:#}", language, e),
            }
        }

        info!(
            "analyzed {} of {} languages",
            analyses.len(),
            self.analyzers.len()
        );
        Ok((layout, analyses))
    }
}

/// Per-language metrics from full analyses, without structure patterns.
pub fn language_metrics(
    analyses: BTreeMap<String, LanguageAnalysis>,
) -> BTreeMap<String, LanguageMetrics> {
    analyses
        .into_iter()
        .map(|(language, analysis)| (language, analysis.metrics.without_layout_patterns()))
        .collect()
}
