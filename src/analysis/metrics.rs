//! Per-language aggregates.

use serde::{Deserialize, Serialize};

use super::facts::{FeatureBag, FileFeatures, LineStats, Tally};
use super::walker::ProjectLayout;
use crate::patterns::{naming_tallies, AnalyzerSettings, Pattern, PatternAnalyzer, PatternType};

/// Aggregate statistics of one language in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageMetrics {
    pub language: String,
    pub file_count: usize,
    pub total_lines: usize,
    /// Mean function length in lines; 0 with no functions.
    pub avg_function_size: f64,
    /// Mean cyclomatic complexity; 0 with no functions.
    pub avg_complexity: f64,
    /// Share of identifiers following their category's dominant style.
    pub naming_consistency: f64,
    /// Share of quote and indentation observations following the dominant choice.
    pub style_consistency: f64,
    #[serde(default)]
    pub line_stats: LineStats,
    pub patterns: Vec<Pattern>,
}

impl LanguageMetrics {
    pub fn empty(language: &str) -> Self {
        Self {
            language: language.to_string(),
            file_count: 0,
            total_lines: 0,
            avg_function_size: 0.0,
            avg_complexity: 0.0,
            naming_consistency: 0.0,
            style_consistency: 0.0,
            line_stats: LineStats::default(),
            patterns: Vec::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.file_count > 0
    }

    /// Drop structure patterns. They describe the shared project layout, not
    /// this language, and would read the same for every language.
    pub fn without_layout_patterns(mut self) -> Self {
        self.patterns.retain(|p| p.pattern_type != PatternType::Structure);
        self
    }
}

/// Everything learned about one language: per-file features, the merged bag
/// and the aggregate metrics.
#[derive(Debug, Clone)]
pub struct LanguageAnalysis {
    pub language: String,
    /// Sorted by path.
    pub files: Vec<FileFeatures>,
    /// Files that could not be read or parsed.
    pub skipped_files: usize,
    pub bag: FeatureBag,
    pub metrics: LanguageMetrics,
}

impl LanguageAnalysis {
    /// Reduce extracted files into bag and metrics.
    pub fn from_files(
        language: &str,
        files: Vec<FileFeatures>,
        skipped_files: usize,
        layout: &ProjectLayout,
        settings: &AnalyzerSettings,
    ) -> Self {
        let bag = FeatureBag::from_files(language, &files, layout);
        let metrics = compute_metrics(language, &files, &bag, settings);
        Self {
            language: language.to_string(),
            files,
            skipped_files,
            bag,
            metrics,
        }
    }

    /// Fraction of files that are tests; `None` without files.
    pub fn test_file_ratio(&self) -> Option<f64> {
        if self.files.is_empty() {
            return None;
        }
        let tests = self.files.iter().filter(|f| f.is_test_file).count();
        Some(tests as f64 / self.files.len() as f64)
    }

    /// Fraction of imports that are wildcards; `None` without imports.
    pub fn wildcard_import_ratio(&self) -> Option<f64> {
        let (wildcards, total) = self
            .files
            .iter()
            .flat_map(|f| f.imports.iter())
            .fold((0usize, 0usize), |(w, t), i| (w + i.wildcard as usize, t + 1));
        if total == 0 {
            return None;
        }
        Some(wildcards as f64 / total as f64)
    }

    /// Histogram of file extensions.
    pub fn extensions(&self) -> Tally {
        self.files.iter().filter_map(|f| f.extension()).collect()
    }

    /// Histogram of test framework references.
    pub fn test_frameworks(&self) -> Tally {
        let mut tally = Tally::new();
        for file in &self.files {
            tally.merge(&file.test_frameworks);
        }
        tally
    }
}

fn compute_metrics(
    language: &str,
    files: &[FileFeatures],
    bag: &FeatureBag,
    settings: &AnalyzerSettings,
) -> LanguageMetrics {
    let mut metrics = LanguageMetrics::empty(language);
    if files.is_empty() {
        return metrics;
    }

    metrics.file_count = files.len();
    metrics.total_lines = files.iter().map(|f| f.total_lines).sum();
    for file in files {
        metrics.line_stats.merge(&file.line_stats);
    }

    let functions: Vec<_> = files.iter().flat_map(|f| f.functions.iter()).collect();
    if !functions.is_empty() {
        let count = functions.len() as f64;
        let lines: usize = functions.iter().map(|f| f.line_count).sum();
        let complexity: u64 = functions.iter().map(|f| f.complexity() as u64).sum();
        metrics.avg_function_size = lines as f64 / count;
        metrics.avg_complexity = complexity as f64 / count;
    }

    let (matching, total) = naming_tallies(bag)
        .values()
        .filter_map(|tally| tally.dominant().map(|(_, n)| (n, tally.total())))
        .fold((0, 0), |(m, t), (n, total)| (m + n, t + total));
    metrics.naming_consistency = ratio(matching, total);

    let quotes = bag.quotes.as_tally();
    let indentation = bag.indentation.as_tally();
    let dominant = |t: &Tally| t.dominant().map(|(_, n)| n).unwrap_or(0);
    metrics.style_consistency = ratio(
        dominant(&quotes) + dominant(&indentation),
        quotes.total() + indentation.total(),
    );

    metrics.patterns = PatternAnalyzer::analyze_all(bag, settings);
    metrics
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::facts::{ControlFlowInfo, FunctionFacts, ImportRecord};

    fn function(line_count: usize, ifs: usize) -> FunctionFacts {
        FunctionFacts {
            name: "f".into(),
            start_line: 1,
            line_count,
            control_flow: ControlFlowInfo {
                if_count: ifs,
                ..Default::default()
            },
            documented: false,
            annotated: None,
        }
    }

    #[test]
    fn test_metrics_averages() {
        let mut a = FileFeatures::empty("a.py", "python");
        a.total_lines = 30;
        a.functions = vec![function(10, 2), function(20, 0)];
        a.identifiers.functions = vec!["load_user".into(), "save_user".into(), "getUser".into()];
        a.quotes.single = 3;
        a.quotes.double = 1;
        a.indentation.space_lines = 4;

        let mut b = FileFeatures::empty("tests/test_a.py", "python");
        b.is_test_file = true;
        b.total_lines = 5;
        b.imports.push(ImportRecord {
            module: "os".into(),
            wildcard: true,
            relative: false,
            line: 1,
        });

        let analysis = LanguageAnalysis::from_files(
            "python",
            vec![a, b],
            1,
            &ProjectLayout::default(),
            &AnalyzerSettings::default(),
        );
        let m = &analysis.metrics;
        assert_eq!(m.file_count, 2);
        assert_eq!(m.total_lines, 35);
        assert!((m.avg_function_size - 15.0).abs() < 1e-9);
        assert!((m.avg_complexity - 2.0).abs() < 1e-9);
        assert!((m.naming_consistency - 2.0 / 3.0).abs() < 1e-9);
        // (3 single + 4 spaces) / (4 quotes + 4 indented lines)
        assert!((m.style_consistency - 7.0 / 8.0).abs() < 1e-9);

        assert_eq!(analysis.test_file_ratio(), Some(0.5));
        assert_eq!(analysis.wildcard_import_ratio(), Some(1.0));
        assert_eq!(analysis.extensions().get("py"), 2);
    }

    #[test]
    fn test_no_files_means_zero_metrics() {
        let analysis = LanguageAnalysis::from_files(
            "go",
            Vec::new(),
            0,
            &ProjectLayout::default(),
            &AnalyzerSettings::default(),
        );
        assert_eq!(analysis.metrics, LanguageMetrics::empty("go"));
        assert!(!analysis.metrics.has_data());
        assert_eq!(analysis.test_file_ratio(), None);
        assert_eq!(analysis.wildcard_import_ratio(), None);
    }
}
