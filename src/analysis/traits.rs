//! Core traits for feature extraction.

use std::path::Path;

use super::FileFeatures;

/// Holds a parsed tree-sitter tree and associated metadata.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get the source code as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// How an extractor recovers structure from source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// A real grammar: function extents and branch counts are exact.
    SyntaxTree,
    /// Regular expressions plus brace balancing. Best-effort: functions
    /// declared in unusual forms are missed, and braces or keywords inside
    /// regex literals can skew extents and complexity.
    Heuristic,
}

/// Language-specific feature extractor.
///
/// Each supported language implements this trait to turn one source file
/// into a [`FileFeatures`] bag.
///
/// # Thread Safety
///
/// Extraction runs on a rayon pool. `tree_sitter::Parser` is not `Sync`, so
/// implementations create parsers per call.
pub trait FeatureExtractor: Send + Sync {
    /// Returns the language identifier (e.g., "python", "javascript").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this extractor handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    fn strategy(&self) -> ExtractionStrategy;

    /// Check that the extractor can run at all (grammar loads, queries
    /// compile). A failure here fails the whole language, not one file.
    fn prepare(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Extract the feature bag of one file.
    ///
    /// `path` is root-relative. An error means the file cannot be analyzed
    /// (syntax errors, invalid encoding); callers skip it.
    fn extract_features(&self, path: &Path, source: &[u8]) -> anyhow::Result<FileFeatures>;

    /// Check if this extractor handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
