//! Learning: from one language's analysis to a scored convention profile.
//!
//! The [`LearningEngine`] drives the primary language's analyzer, assesses
//! project maturity, picks a strictness, and maps the accepted patterns onto
//! tool settings. Results can be saved and reloaded through a
//! [`SnapshotStore`].

mod engine;
mod maturity;
mod preferences;
mod result;
mod rules;
mod snapshot;

pub use engine::{LearningEngine, FALLBACK_LANGUAGE};
pub use maturity::{assess, MaturityAxes};
pub use preferences::{complexity_preference, infer_preferences};
pub use result::{
    CustomRules, LearningResult, Maturity, RuleSet, TeamPreferences, MAX_STRICTNESS,
    MIN_STRICTNESS,
};
pub use rules::{complexity_threshold, derive_rules, function_length_threshold, threshold_rules};
pub use snapshot::{Snapshot, SnapshotStore};

pub(crate) use engine::ensure_root;
pub(crate) use result::{clamp_strictness, unix_timestamp};
pub(crate) use rules::merge_rules;
pub(crate) use snapshot::{check_learning_result, check_range};
