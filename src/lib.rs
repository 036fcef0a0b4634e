//! Stylelearn - coding convention learner.
//!
//! Stylelearn reads a source tree and infers the conventions it already
//! follows: identifier naming, project layout, quoting and indentation,
//! documentation habits. Each convention is scored with a confidence, the
//! project's maturity is assessed, and the confident conventions are mapped
//! onto linter and formatter settings at a matching strictness.
//!
//! # Architecture
//!
//! - `analysis`: per-language feature extraction (tree-sitter for Python, Go
//!   and Rust; regex heuristics for JavaScript and TypeScript)
//! - `patterns`: the naming, structure, style and documentation analyzers
//! - `learning`: the learning engine, maturity, rules and snapshots
//! - `multi_language`: runs every language analyzer over one tree
//! - `integrator`: cross-language consistency and the unified result
//! - `config`: YAML configuration
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use stylelearn::{LearningConfig, PatternLearningIntegrator};
//!
//! let integrator = PatternLearningIntegrator::new(LearningConfig::default());
//! let result = integrator.run(Path::new(".")).unwrap();
//! println!("{} at strictness {:.2}", result.overall_maturity, result.overall_strictness);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod integrator;
pub mod learning;
pub mod multi_language;
pub mod patterns;
pub mod report;

pub use analysis::{LanguageAnalyzer, LanguageMetrics};
pub use config::LearningConfig;
pub use error::LearnError;
pub use integrator::{CrossLanguagePattern, IntegratedLearningResult, PatternLearningIntegrator};
pub use learning::{LearningEngine, LearningResult, Maturity};
pub use multi_language::MultiLanguageManager;
pub use patterns::{Pattern, PatternAnalyzer, PatternType, PatternValue};
