//! Source analysis: feature extraction and per-language aggregation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ FeatureExtractor │────▶│ FileFeatures  │
//! └─────────────────┘     │ (per language)   │     │ (per file)    │
//!                         └──────────────────┘     └───────────────┘
//!                                                          │ reduce
//!                                                          ▼
//!                         ┌──────────────────┐     ┌───────────────┐
//!                         │ LanguageMetrics  │◀────│ FeatureBag    │
//!                         │ + Patterns       │     │ (per language)│
//!                         └──────────────────┘     └───────────────┘
//! ```
//!
//! Python, Go and Rust are read through tree-sitter grammars. JavaScript and
//! TypeScript use regex heuristics (see [`ExtractionStrategy`]).
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `FeatureExtractor` trait
//! 3. Register the extractor and its extensions in `languages/mod.rs`

mod analyzer;
mod facts;
mod languages;
mod metrics;
mod text;
mod traits;
mod treesitter;
mod walker;

pub use analyzer::LanguageAnalyzer;
pub use facts::{
    ClassFacts, ControlFlowInfo, FeatureBag, FileFeatures, FunctionFacts, IdentifierKind,
    Identifiers, ImportRecord, IndentationTally, LineStats, QuoteTally, Tally,
};
pub use languages::{
    get_extractor, language_for_extension, registered_languages, Dialect, GoExtractor,
    JavaScriptExtractor, PythonExtractor, RustExtractor,
};
pub use metrics::{LanguageAnalysis, LanguageMetrics};
pub use traits::{ExtractionStrategy, FeatureExtractor, ParsedFile};
pub use walker::{
    collect_files, is_test_path, ProjectLayout, ScanOptions, DEFAULT_EXCLUDED_DIRS, TEST_DIRS,
};
