//! Project maturity assessment.
//!
//! Five axes are scored in [0, 1] and blended with fixed weights. An axis
//! with nothing to measure (no documentable items, no imports, ...) drops
//! out of both the numerator and the denominator.

use crate::analysis::{LanguageAnalysis, ProjectLayout};
use crate::patterns::CONVENTIONAL_DIRS;

use super::result::Maturity;

const WEIGHT_DOCUMENTATION: f64 = 20.0;
const WEIGHT_TESTS: f64 = 25.0;
const WEIGHT_COMPLEXITY: f64 = 15.0;
const WEIGHT_STRUCTURE: f64 = 20.0;
const WEIGHT_IMPORTS: f64 = 10.0;

/// Test-file ratio that earns the full tests score.
const FULL_TEST_RATIO: f64 = 0.25;
/// File count that earns the full structure bonus.
const FULL_FILE_BONUS: f64 = 50.0;

/// Per-axis scores; `None` when the axis has no data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaturityAxes {
    pub documentation: Option<f64>,
    pub tests: Option<f64>,
    pub complexity: Option<f64>,
    pub structure: Option<f64>,
    pub imports: Option<f64>,
}

impl MaturityAxes {
    pub fn measure(analysis: &LanguageAnalysis, layout: &ProjectLayout) -> Self {
        let documentation = analysis.bag.documentation_coverage();

        let tests = analysis
            .test_file_ratio()
            .map(|ratio| (ratio / FULL_TEST_RATIO).min(1.0));

        let has_functions = analysis.files.iter().any(|f| !f.functions.is_empty());
        let complexity = has_functions
            .then(|| (10.0 - analysis.metrics.avg_complexity).max(0.0) / 10.0);

        let structure = (!analysis.files.is_empty()).then(|| {
            let present = CONVENTIONAL_DIRS
                .iter()
                .filter(|(_, dirs)| layout.has_any_dir(dirs))
                .count() as f64;
            let dirs_score = present / CONVENTIONAL_DIRS.len() as f64;
            let size_bonus = (analysis.files.len() as f64 / FULL_FILE_BONUS).min(1.0);
            dirs_score * 0.8 + size_bonus * 0.2
        });

        let imports = analysis.wildcard_import_ratio().map(|ratio| 1.0 - ratio);

        Self {
            documentation,
            tests,
            complexity,
            structure,
            imports,
        }
    }

    fn weighted(&self) -> [(Option<f64>, f64); 5] {
        [
            (self.documentation, WEIGHT_DOCUMENTATION),
            (self.tests, WEIGHT_TESTS),
            (self.complexity, WEIGHT_COMPLEXITY),
            (self.structure, WEIGHT_STRUCTURE),
            (self.imports, WEIGHT_IMPORTS),
        ]
    }

    /// Weighted mean of the measured axes; 0 when none were measured.
    pub fn ratio(&self) -> f64 {
        let (sum, weight) = self
            .weighted()
            .iter()
            .filter_map(|(score, weight)| score.map(|s| (s * weight, *weight)))
            .fold((0.0, 0.0), |(sum, total), (s, w)| (sum + s, total + w));
        if weight == 0.0 {
            return 0.0;
        }
        (sum / weight).clamp(0.0, 1.0)
    }
}

/// Maturity bucket and the underlying ratio.
pub fn assess(analysis: &LanguageAnalysis, layout: &ProjectLayout) -> (Maturity, f64) {
    let ratio = MaturityAxes::measure(analysis, layout).ratio();
    (Maturity::from_ratio(ratio), ratio)
}
