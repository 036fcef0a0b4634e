//! Team preference inference.

use serde_json::json;

use crate::analysis::LanguageAnalysis;

use super::result::TeamPreferences;

/// Label for an average complexity: `simple` below 3, `moderate` below 7.
pub fn complexity_preference(avg_complexity: f64) -> &'static str {
    if avg_complexity < 3.0 {
        "simple"
    } else if avg_complexity < 7.0 {
        "moderate"
    } else {
        "complex"
    }
}

/// Most frequent extension, test framework and doc format, plus the
/// complexity label. Keys with nothing observed are left out.
pub fn infer_preferences(analysis: &LanguageAnalysis) -> TeamPreferences {
    let mut prefs = TeamPreferences::new();

    if let Some((ext, _)) = analysis.extensions().dominant() {
        prefs.insert("preferred_extension".into(), json!(ext));
    }
    if let Some((framework, _)) = analysis.test_frameworks().dominant() {
        prefs.insert("test_framework".into(), json!(framework));
    }
    if let Some((format, _)) = analysis.bag.doc_formats.dominant() {
        prefs.insert("doc_style".into(), json!(format));
    }
    if analysis.metrics.has_data() {
        prefs.insert(
            "complexity_preference".into(),
            json!(complexity_preference(analysis.metrics.avg_complexity)),
        );
    }

    prefs
}
