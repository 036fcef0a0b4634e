//! Learning configuration.
//!
//! Every threshold used by the analyzers, the engine and the integrator lives
//! in one [`LearningConfig`] value that callers pass in explicitly. It is
//! read from `stylelearn.yaml` (or `.stylelearn.yaml`) in the project root
//! when present.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{registered_languages, ScanOptions, DEFAULT_EXCLUDED_DIRS};
use crate::patterns::{AnalyzerSettings, DEFAULT_ANALYZER_FLOOR, DEFAULT_STEEPNESS};

/// File names searched for in the project root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stylelearn.yaml", ".stylelearn.yaml"];

/// Directory (under the project root) holding saved snapshots.
pub const DEFAULT_STATE_DIR: &str = ".analysis-state";

/// Tunables for a learning run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Engine acceptance bar for patterns in a `LearningResult`.
    pub min_pattern_confidence: f64,
    /// Noise floor applied inside each pattern analyzer.
    pub analyzer_confidence_floor: f64,
    /// Steepness `k` of the share-to-confidence sigmoid.
    pub confidence_steepness: f64,
    /// Weight of a fresh strictness when adapting a previous result.
    pub adaptation_rate: f64,
    /// Directory names never descended into.
    pub excluded_dirs: Vec<String>,
    /// Glob patterns (root-relative) for paths to skip, e.g. "**/generated/**".
    pub excluded_paths: Vec<String>,
    /// Restrict analysis to these language ids. Empty means all.
    pub languages: Vec<String>,
    /// Language the engine learns from. Detected from file counts when unset.
    pub primary_language: Option<String>,
    /// Cap on files analyzed per language.
    pub max_files: Option<usize>,
    /// Extract files on the rayon pool.
    pub parallel: bool,
    pub state_dir: String,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_pattern_confidence: 0.7,
            analyzer_confidence_floor: DEFAULT_ANALYZER_FLOOR,
            confidence_steepness: DEFAULT_STEEPNESS,
            adaptation_rate: 0.3,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_paths: Vec::new(),
            languages: Vec::new(),
            primary_language: None,
            max_files: None,
            parallel: true,
            state_dir: DEFAULT_STATE_DIR.to_string(),
        }
    }
}

impl LearningConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: LearningConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a configuration file in `root`.
    pub fn discover(root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// Load the configuration for a project: `explicit` if given, else a
    /// discovered file, else defaults. The result is validated.
    pub fn load_for(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config = match explicit.map(Path::to_path_buf).or_else(|| Self::discover(root)) {
            Some(path) => {
                log::debug!("loading configuration from {}", path.display());
                Self::parse_file(&path).map_err(|e| {
                    anyhow::anyhow!("failed to load config {}: {}", path.display(), e)
                })?
            }
            None => Self::default(),
        };
        validate(&config)?;
        Ok(config)
    }

    pub fn scan_options(&self) -> anyhow::Result<ScanOptions> {
        ScanOptions::new(&self.excluded_dirs, &self.excluded_paths, self.max_files)
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            confidence_floor: self.analyzer_confidence_floor,
            steepness: self.confidence_steepness,
        }
    }

    /// Languages to analyze: the configured list, or every registered one.
    pub fn active_languages(&self) -> Vec<String> {
        if self.languages.is_empty() {
            registered_languages()
        } else {
            self.languages.clone()
        }
    }

    /// Snapshot directory for a project.
    pub fn state_dir_for(&self, root: &Path) -> PathBuf {
        root.join(&self.state_dir)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn check_unit(name: &str, value: f64) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{} must be within [0, 1], got {}", name, value);
    }
    Ok(())
}

/// Validate a configuration for correctness.
pub fn validate(config: &LearningConfig) -> anyhow::Result<()> {
    check_unit("min_pattern_confidence", config.min_pattern_confidence)?;
    check_unit("analyzer_confidence_floor", config.analyzer_confidence_floor)?;
    check_unit("adaptation_rate", config.adaptation_rate)?;

    if !(config.confidence_steepness > 0.0 && config.confidence_steepness.is_finite()) {
        anyhow::bail!(
            "confidence_steepness must be a positive number, got {}",
            config.confidence_steepness
        );
    }

    if config.max_files == Some(0) {
        anyhow::bail!("max_files must be at least 1");
    }

    if config.state_dir.trim().is_empty() {
        anyhow::bail!("state_dir must not be empty");
    }

    let known = registered_languages();
    for lang in config.languages.iter().chain(config.primary_language.iter()) {
        if !known.contains(lang) {
            anyhow::bail!(
                "unknown language {:?}, expected one of: {}",
                lang,
                known.join(", ")
            );
        }
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
min_pattern_confidence: 0.8
languages: [python, typescript]
excluded_paths:
  - "**/migrations/**"
"#;
        let config: LearningConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.min_pattern_confidence, 0.8);
        assert_eq!(config.analyzer_confidence_floor, DEFAULT_ANALYZER_FLOOR);
        assert_eq!(config.languages, vec!["python", "typescript"]);
        assert!(config.parallel);
        assert!(config.excluded_dirs.contains(&"node_modules".to_string()));
        validate(&config).unwrap();
    }

    #[test]
    fn test_steepness_reaches_analyzers() {
        let config: LearningConfig = serde_yaml::from_str("confidence_steepness: 5.0\n").unwrap();
        assert_eq!(config.analyzer_settings().steepness, 5.0);
        assert_eq!(
            LearningConfig::default().analyzer_settings().steepness,
            DEFAULT_STEEPNESS
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = LearningConfig {
            min_pattern_confidence: 1.5,
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = LearningConfig {
            languages: vec!["cobol".into()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = LearningConfig {
            excluded_paths: vec!["[".into()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = LearningConfig {
            confidence_steepness: 0.0,
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_discover_and_load() {
        let temp = TempDir::new().unwrap();
        assert!(LearningConfig::discover(temp.path()).is_none());
        assert_eq!(
            LearningConfig::load_for(temp.path(), None).unwrap(),
            LearningConfig::default()
        );

        fs::write(temp.path().join(".stylelearn.yaml"), "adaptation_rate: 0.5\n").unwrap();
        let config = LearningConfig::load_for(temp.path(), None).unwrap();
        assert_eq!(config.adaptation_rate, 0.5);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = LearningConfig::default();
        let yaml = config.to_yaml().unwrap();
        let back: LearningConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
