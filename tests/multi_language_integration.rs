//! Integration tests for multi-language analysis and integration.

use std::path::Path;

use stylelearn::integrator::{AVG_COMPLEXITY, AVG_FUNCTION_SIZE};
use stylelearn::{
    LearningConfig, MultiLanguageManager, PatternLearningIntegrator, PatternValue,
};

const MIXED_PROJECT: &str = "testdata/mixed_project";

#[test]
fn test_manager_reports_each_language_with_files() {
    let manager = MultiLanguageManager::new(LearningConfig::default());
    let metrics = manager.analyze(Path::new(MIXED_PROJECT)).unwrap();

    let languages: Vec<&str> = metrics.keys().map(String::as_str).collect();
    assert_eq!(languages, vec!["javascript", "python"]);

    let python = &metrics["python"];
    assert_eq!(python.file_count, 3);
    assert!(python.avg_complexity >= 1.0);
    assert!((0.0..=1.0).contains(&python.naming_consistency));

    let javascript = &metrics["javascript"];
    assert_eq!(javascript.file_count, 2);
    let naming = javascript
        .patterns
        .iter()
        .find(|p| p.pattern_name == "function_naming")
        .unwrap();
    assert_eq!(naming.pattern_value, PatternValue::Text("camelCase".into()));
}

#[test]
fn test_language_filter_restricts_manager() {
    let config = LearningConfig {
        languages: vec!["javascript".into()],
        ..Default::default()
    };
    let metrics = MultiLanguageManager::new(config)
        .analyze(Path::new(MIXED_PROJECT))
        .unwrap();
    assert_eq!(metrics.len(), 1);
    assert!(metrics.contains_key("javascript"));
}

#[test]
fn test_integration_reconciles_languages() {
    let integrator = PatternLearningIntegrator::new(LearningConfig::default());
    let result = integrator.run(Path::new(MIXED_PROJECT)).unwrap();

    let primary = result.primary_result.as_ref().unwrap();
    assert_eq!(primary.language, "python");

    let naming = result
        .cross_language_patterns
        .iter()
        .find(|c| c.pattern_name == "function_naming")
        .unwrap();
    assert_eq!(naming.languages, vec!["javascript", "python"]);
    assert_eq!(naming.consistency_score, 0.5);
    assert!(naming.recommendation.starts_with("Unify"));

    for name in [AVG_COMPLEXITY, AVG_FUNCTION_SIZE] {
        let derived = result
            .cross_language_patterns
            .iter()
            .find(|c| c.pattern_name == name)
            .unwrap();
        assert!((0.0..=1.0).contains(&derived.consistency_score));
    }

    // Layout patterns are shared by every language and never compared.
    assert!(result
        .cross_language_patterns
        .iter()
        .all(|c| c.pattern_name != "dominant_language" && !c.pattern_name.starts_with("has_")));

    assert!((0.3..=1.0).contains(&result.overall_strictness));
    assert!(result.language_rules.contains_key("python"));
    assert!(result.language_rules.contains_key("javascript"));
    assert!(result.language_rules["javascript"].contains_key("eslint"));
    assert!(!result.recommendations.is_empty());
}

#[test]
fn test_single_language_project_has_no_cross_patterns() {
    let integrator = PatternLearningIntegrator::new(LearningConfig::default());
    let result = integrator.run(Path::new("testdata/python_project")).unwrap();

    assert_eq!(result.language_metrics.len(), 1);
    // Only the primary result and the python metrics report patterns, and
    // both are keyed by the same language.
    assert!(result.cross_language_patterns.is_empty());
}

#[test]
fn test_integrated_snapshot_round_trip() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("app.py"),
        "def load_user(user_id):\n    return user_id\n",
    )
    .unwrap();
    std::fs::write(
        temp.path().join("app.js"),
        "function loadUser(userId) {\n  return userId;\n}\n",
    )
    .unwrap();

    let integrator = PatternLearningIntegrator::new(LearningConfig::default());
    let result = integrator.run(temp.path()).unwrap();
    integrator.save(temp.path(), &result).unwrap();
    let loaded = integrator.load(temp.path()).unwrap();
    assert_eq!(loaded, result);
}
