//! Errors surfaced to callers of the learning pipeline.
//!
//! File-level and language-level failures never reach this type: they are
//! absorbed (and logged) where they happen. What remains are conditions a
//! caller must decide about.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while learning, saving or loading.
#[derive(Error, Debug)]
pub enum LearnError {
    /// The project root does not exist or is not a directory.
    #[error("project root not found: {0}")]
    RootNotFound(PathBuf),

    /// No snapshot has been saved for the project.
    #[error("no saved snapshot at {0}")]
    SnapshotNotFound(PathBuf),

    /// A snapshot exists but does not have the expected shape.
    #[error("invalid snapshot {path}: {source}")]
    InvalidSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Analysis(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LearnError>;
