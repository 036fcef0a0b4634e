//! Integration tests for the learning engine over fixture projects.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;
use walkdir::WalkDir;

use stylelearn::{LearnError, LearningConfig, LearningEngine, LearningResult, Maturity, PatternValue};

const PYTHON_PROJECT: &str = "testdata/python_project";

/// Copy a fixture into a scratch directory so snapshots don't land in the repo.
fn copy_fixture(fixture: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    for entry in WalkDir::new(fixture) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(fixture).unwrap();
        let target: PathBuf = temp.path().join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    temp
}

fn pattern_value(result: &LearningResult, name: &str) -> Option<PatternValue> {
    result.find_pattern(name).map(|p| p.pattern_value.clone())
}

#[test]
fn test_learns_python_conventions() {
    let engine = LearningEngine::new(LearningConfig::default());
    let result = engine.learn(Path::new(PYTHON_PROJECT)).unwrap();

    assert_eq!(result.language, "python");
    assert_eq!(
        pattern_value(&result, "function_naming"),
        Some(PatternValue::Text("snake_case".into()))
    );
    assert_eq!(
        pattern_value(&result, "class_naming"),
        Some(PatternValue::Text("PascalCase".into()))
    );
    assert_eq!(
        pattern_value(&result, "constant_naming"),
        Some(PatternValue::Text("UPPER_SNAKE_CASE".into()))
    );
    assert_eq!(
        pattern_value(&result, "quote_style"),
        Some(PatternValue::Text("double".into()))
    );
    assert_eq!(
        pattern_value(&result, "has_tests_directory"),
        Some(PatternValue::Flag(true))
    );
    assert_eq!(
        pattern_value(&result, "high_documentation_coverage"),
        Some(PatternValue::Flag(true))
    );

    for pattern in &result.patterns {
        assert!(pattern.confidence >= 0.7, "{} below acceptance", pattern.pattern_name);
        assert!(pattern.examples.len() <= 5);
    }

    assert_ne!(result.project_maturity, Maturity::Beginner);
    assert!((0.1..=1.0).contains(&result.recommended_strictness));

    assert_eq!(
        result.custom_rules["pylint"]["function-naming-style"],
        json!("snake_case")
    );
    assert_eq!(result.team_preferences["preferred_extension"], json!("py"));
    assert_eq!(result.team_preferences["test_framework"], json!("pytest"));
    assert_eq!(result.team_preferences["complexity_preference"], json!("simple"));
}

#[test]
fn test_learning_is_idempotent() {
    let engine = LearningEngine::new(LearningConfig::default());
    let first = engine.learn(Path::new(PYTHON_PROJECT)).unwrap();
    let second = engine.learn(Path::new(PYTHON_PROJECT)).unwrap();

    assert_eq!(first.project_maturity, second.project_maturity);
    assert_eq!(first.recommended_strictness, second.recommended_strictness);
    assert_eq!(first.patterns, second.patterns);
    assert_eq!(first.custom_rules, second.custom_rules);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let parallel = LearningEngine::new(LearningConfig::default());
    let sequential = LearningEngine::new(LearningConfig {
        parallel: false,
        ..Default::default()
    });

    let a = parallel.learn(Path::new(PYTHON_PROJECT)).unwrap();
    let b = sequential.learn(Path::new(PYTHON_PROJECT)).unwrap();
    assert_eq!(a.patterns, b.patterns);
    assert_eq!(a.recommended_strictness, b.recommended_strictness);
}

#[test]
fn test_save_and_load_round_trip() {
    let project = copy_fixture(PYTHON_PROJECT);
    let engine = LearningEngine::new(LearningConfig::default());

    let result = engine.learn(project.path()).unwrap();
    let path = engine.save(project.path(), &result).unwrap();
    assert!(path.starts_with(project.path().join(".analysis-state")));

    let loaded = engine.load(project.path()).unwrap();
    assert_eq!(loaded, result);

    // The state directory is hidden, so learning again is unaffected.
    let again = engine.learn(project.path()).unwrap();
    assert_eq!(again.patterns, result.patterns);
}

#[test]
fn test_load_distinguishes_missing_and_invalid() {
    let project = copy_fixture(PYTHON_PROJECT);
    let engine = LearningEngine::new(LearningConfig::default());

    let err = engine.load(project.path()).unwrap_err();
    assert!(matches!(err, LearnError::SnapshotNotFound(_)));

    let state = project.path().join(".analysis-state");
    fs::create_dir_all(&state).unwrap();
    fs::write(state.join("learning_result.json"), "{\"project_maturity\": 7}").unwrap();
    let err = engine.load(project.path()).unwrap_err();
    assert!(matches!(err, LearnError::InvalidSnapshot { .. }));
}

#[test]
fn test_adapt_blends_with_previous_snapshot() {
    let engine = LearningEngine::new(LearningConfig {
        adaptation_rate: 0.5,
        ..Default::default()
    });
    let fresh = engine.learn(Path::new(PYTHON_PROJECT)).unwrap();

    let previous = LearningResult {
        recommended_strictness: 0.1,
        ..fresh.clone()
    };
    let adapted = engine.adapt(&previous, fresh.clone());
    let expected = 0.1 + 0.5 * (fresh.recommended_strictness - 0.1);
    assert!((adapted.recommended_strictness - expected).abs() < 1e-9);
    assert_eq!(adapted.patterns, fresh.patterns);
}

#[test]
fn test_excluded_dirs_hide_tests() {
    let config = LearningConfig {
        excluded_dirs: vec!["tests".into()],
        ..Default::default()
    };
    let result = LearningEngine::new(config)
        .learn(Path::new(PYTHON_PROJECT))
        .unwrap();
    assert!(result.find_pattern("has_tests_directory").is_none());
    assert!(!result.team_preferences.contains_key("test_framework"));
}

#[test]
fn test_missing_root_is_reported() {
    let engine = LearningEngine::new(LearningConfig::default());
    let err = engine.learn(Path::new("testdata/does_not_exist")).unwrap_err();
    assert!(matches!(err, LearnError::RootNotFound(_)));
}
