//! Language analyzer: a feature extractor composed with the pattern analyzers.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;

use super::facts::FileFeatures;
use super::languages::get_extractor;
use super::metrics::LanguageAnalysis;
use super::walker::{collect_files, ProjectLayout, ScanOptions};
use super::{ExtractionStrategy, FeatureExtractor};
use crate::config::LearningConfig;

/// Runs one language's extractor over a tree and reduces the results.
#[derive(Clone, Copy)]
pub struct LanguageAnalyzer {
    extractor: &'static dyn FeatureExtractor,
}

impl LanguageAnalyzer {
    pub fn new(extractor: &'static dyn FeatureExtractor) -> Self {
        Self { extractor }
    }

    /// Analyzer for a registered language id.
    pub fn for_language(lang_id: &str) -> Option<Self> {
        get_extractor(lang_id).map(Self::new)
    }

    pub fn language_id(&self) -> &'static str {
        self.extractor.language_id()
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        self.extractor.strategy()
    }

    /// Extract features from every matching file under `root`.
    ///
    /// Unreadable and unparseable files are skipped; the second element is
    /// how many. Results are sorted by path whatever the completion order.
    pub fn extract(
        &self,
        root: &Path,
        options: &ScanOptions,
        parallel: bool,
    ) -> (Vec<FileFeatures>, usize) {
        let paths = collect_files(root, self.extractor.file_extensions(), options);

        let results: Vec<(&PathBuf, anyhow::Result<FileFeatures>)> = if parallel {
            paths
                .par_iter()
                .map(|path| (path, self.extract_file(root, path)))
                .collect()
        } else {
            paths
                .iter()
                .map(|path| (path, self.extract_file(root, path)))
                .collect()
        };

        let mut files = Vec::with_capacity(results.len());
        let mut skipped = 0;
        for (path, result) in results {
            match result {
                Ok(features) => files.push(features),
                Err(e) => {
                    debug!("skipping {}: {}", path.display(), e);
                    skipped += 1;
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        (files, skipped)
    }

    fn extract_file(&self, root: &Path, path: &Path) -> anyhow::Result<FileFeatures> {
        let source = fs::read(path)?;
        let rel_path = path.strip_prefix(root).unwrap_or(path);
        self.extractor.extract_features(rel_path, &source)
    }

    /// Extract, aggregate and run the pattern analyzers.
    ///
    /// Fails only when the extractor itself cannot run (grammar or query
    /// errors) or the configuration is unusable; per-file problems are
    /// absorbed.
    pub fn analyze(
        &self,
        root: &Path,
        layout: &ProjectLayout,
        config: &LearningConfig,
    ) -> anyhow::Result<LanguageAnalysis> {
        self.extractor.prepare()?;
        let options = config.scan_options()?;

        let (files, skipped) = self.extract(root, &options, config.parallel);
        info!(
            "{}: analyzed {} files ({} skipped)",
            self.language_id(),
            files.len(),
            skipped
        );

        Ok(LanguageAnalysis::from_files(
            self.language_id(),
            files,
            skipped,
            layout,
            &config.analyzer_settings(),
        ))
    }
}

impl std::fmt::Debug for LanguageAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageAnalyzer")
            .field("language", &self.language_id())
            .field("strategy", &self.strategy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_skips_broken_files_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("b.py"), "def b():\n    return 1\n").unwrap();
        fs::write(root.join("a.py"), "def a():\n    return 2\n").unwrap();
        fs::write(root.join("broken.py"), "def broken(:\n").unwrap();
        fs::write(root.join("latin1.py"), [0x63u8, 0x3d, 0xe9, 0x0a]).unwrap();

        let analyzer = LanguageAnalyzer::for_language("python").unwrap();
        for parallel in [true, false] {
            let (files, skipped) = analyzer.extract(root, &ScanOptions::default(), parallel);
            let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
            assert_eq!(paths, vec!["a.py", "b.py"]);
            assert_eq!(skipped, 2);
        }
    }

    #[test]
    fn test_analyze_builds_metrics() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(
            root.join("app.py"),
            "def load_user(user_id):\n    if user_id:\n        return 1\n    return 0\n",
        )
        .unwrap();

        let config = LearningConfig::default();
        let layout = ProjectLayout::scan(root, &config.scan_options().unwrap());
        let analysis = LanguageAnalyzer::for_language("python")
            .unwrap()
            .analyze(root, &layout, &config)
            .unwrap();

        assert_eq!(analysis.metrics.file_count, 1);
        assert_eq!(analysis.metrics.avg_complexity, 2.0);
        assert_eq!(analysis.metrics.avg_function_size, 4.0);
    }
}
