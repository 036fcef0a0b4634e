//! Snapshot persistence.
//!
//! A snapshot is one JSON document per project and result kind, stored under
//! the project's state directory. Saving replaces the file whole (write to a
//! temporary file, then rename); loading replaces the caller's value whole.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::result::{LearningResult, MAX_STRICTNESS, MIN_STRICTNESS};
use crate::error::{LearnError, Result};
use crate::patterns::MAX_EXAMPLES;

/// A value that can be stored as a project snapshot.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// File name inside the state directory.
    const FILE_NAME: &'static str;

    /// Range checks the type system cannot express. The message becomes an
    /// invalid-snapshot error.
    fn check(&self) -> std::result::Result<(), String>;
}

impl Snapshot for LearningResult {
    const FILE_NAME: &'static str = "learning_result.json";

    fn check(&self) -> std::result::Result<(), String> {
        check_learning_result(self)
    }
}

pub(crate) fn check_learning_result(result: &LearningResult) -> std::result::Result<(), String> {
    check_range(
        "recommended_strictness",
        result.recommended_strictness,
        MIN_STRICTNESS,
        MAX_STRICTNESS,
    )?;
    if !(result.generated_at.is_finite() && result.generated_at >= 0.0) {
        return Err(format!("generated_at must be a unix timestamp, got {}", result.generated_at));
    }
    for pattern in &result.patterns {
        check_range(
            &format!("confidence of {}", pattern.pattern_name),
            pattern.confidence,
            0.0,
            1.0,
        )?;
        if pattern.examples.len() > MAX_EXAMPLES {
            return Err(format!(
                "pattern {} has {} examples, at most {} allowed",
                pattern.pattern_name,
                pattern.examples.len(),
                MAX_EXAMPLES
            ));
        }
    }
    Ok(())
}

pub(crate) fn check_range(
    name: &str,
    value: f64,
    min: f64,
    max: f64,
) -> std::result::Result<(), String> {
    if !(min..=max).contains(&value) {
        return Err(format!("{} must be within [{}, {}], got {}", name, min, max, value));
    }
    Ok(())
}

/// Reads and writes snapshots in one state directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of<S: Snapshot>(&self) -> PathBuf {
        self.dir.join(S::FILE_NAME)
    }

    /// Write `value`, replacing any previous snapshot. Returns the file path.
    pub fn save<S: Snapshot>(&self, value: &S) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_of::<S>();
        let json = serde_json::to_string_pretty(value).map_err(LearnError::Encode)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        log::debug!("saved snapshot {}", path.display());
        Ok(path)
    }

    /// Read a snapshot.
    ///
    /// A missing file is [`LearnError::SnapshotNotFound`]; malformed JSON, a
    /// shape mismatch or out-of-range values are [`LearnError::InvalidSnapshot`].
    pub fn load<S: Snapshot>(&self) -> Result<S> {
        let path = self.path_of::<S>();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LearnError::SnapshotNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };

        let value: S = serde_json::from_str(&content).map_err(|source| {
            LearnError::InvalidSnapshot {
                path: path.clone(),
                source,
            }
        })?;

        value.check().map_err(|msg| LearnError::InvalidSnapshot {
            path,
            source: <serde_json::Error as serde::de::Error>::custom(msg),
        })?;

        Ok(value)
    }
}
