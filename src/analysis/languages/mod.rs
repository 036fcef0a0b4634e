//! Language-specific feature extractors.

mod go;
mod javascript;
mod python;
mod rust_lang;

pub use go::GoExtractor;
pub use javascript::{Dialect, JavaScriptExtractor};
pub use python::PythonExtractor;
pub use rust_lang::RustExtractor;

use super::FeatureExtractor;
use once_cell::sync::OnceCell;

/// Static storage for Go extractor.
static GO_EXTRACTOR: OnceCell<GoExtractor> = OnceCell::new();

/// Static storage for JavaScript extractor.
static JAVASCRIPT_EXTRACTOR: OnceCell<JavaScriptExtractor> = OnceCell::new();

/// Static storage for Python extractor.
static PYTHON_EXTRACTOR: OnceCell<PythonExtractor> = OnceCell::new();

/// Static storage for Rust extractor.
static RUST_EXTRACTOR: OnceCell<RustExtractor> = OnceCell::new();

/// Static storage for TypeScript extractor.
static TYPESCRIPT_EXTRACTOR: OnceCell<JavaScriptExtractor> = OnceCell::new();

/// Language ids in registration order.
const LANGUAGES: &[&str] = &["python", "javascript", "typescript", "go", "rust"];

/// Get an extractor by language ID.
///
/// Extractors are created on first use and live for the process.
/// Returns None if no extractor is registered for the language.
pub fn get_extractor(lang_id: &str) -> Option<&'static dyn FeatureExtractor> {
    match lang_id {
        "go" => Some(GO_EXTRACTOR.get_or_init(GoExtractor::new) as &'static dyn FeatureExtractor),
        "javascript" => Some(JAVASCRIPT_EXTRACTOR.get_or_init(JavaScriptExtractor::javascript)
            as &'static dyn FeatureExtractor),
        "python" => Some(PYTHON_EXTRACTOR.get_or_init(PythonExtractor::new)
            as &'static dyn FeatureExtractor),
        "rust" => Some(RUST_EXTRACTOR.get_or_init(RustExtractor::new)
            as &'static dyn FeatureExtractor),
        "typescript" => Some(TYPESCRIPT_EXTRACTOR.get_or_init(JavaScriptExtractor::typescript)
            as &'static dyn FeatureExtractor),
        _ => None,
    }
}

/// Map a file extension (without dot) to the language that owns it.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "py" | "pyi" => Some("python"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "tsx" | "mts" | "cts" => Some("typescript"),
        "go" => Some("go"),
        "rs" => Some("rust"),
        _ => None,
    }
}

/// Get all registered language IDs.
pub fn registered_languages() -> Vec<String> {
    LANGUAGES.iter().map(|s| s.to_string()).collect()
}
