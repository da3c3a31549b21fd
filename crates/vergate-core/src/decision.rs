use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::failure::RetrievalFailure;
use crate::version::{Version, compare};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateKind {
    NoUpdateNeeded,
    UpdateAvailable,
}

/// How a confirmed newer version is presented to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateBehavior {
    /// Block further use until the user starts the update.
    #[default]
    Force,
    /// Offer the update but let the user dismiss it.
    Notify,
    /// Skip retrieval and never report an update.
    DoNotCheck,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub kind: UpdateKind,
    pub installed: Version,
    /// `None` when the latest version could not be determined.
    pub latest: Option<Version>,
    pub forced: bool,
}

impl UpdateDecision {
    pub(crate) fn no_update(installed: Version, latest: Option<Version>) -> Self {
        Self {
            kind: UpdateKind::NoUpdateNeeded,
            installed,
            latest,
            forced: false,
        }
    }

    #[must_use]
    pub fn is_update_available(&self) -> bool {
        self.kind == UpdateKind::UpdateAvailable
    }
}

/// Decide whether `installed` must be updated, failing open when the latest
/// version is unknown.
#[must_use]
pub fn decide(
    installed: &Version,
    latest_result: &Result<Version, RetrievalFailure>,
) -> UpdateDecision {
    decide_with_behavior(installed, latest_result, UpdateBehavior::Force)
}

#[must_use]
pub fn decide_with_behavior(
    installed: &Version,
    latest_result: &Result<Version, RetrievalFailure>,
    behavior: UpdateBehavior,
) -> UpdateDecision {
    let Ok(latest) = latest_result else {
        return UpdateDecision::no_update(*installed, None);
    };

    if behavior == UpdateBehavior::DoNotCheck {
        return UpdateDecision::no_update(*installed, Some(*latest));
    }

    match compare(latest, installed) {
        Ordering::Greater => UpdateDecision {
            kind: UpdateKind::UpdateAvailable,
            installed: *installed,
            latest: Some(*latest),
            forced: behavior == UpdateBehavior::Force,
        },
        Ordering::Equal | Ordering::Less => UpdateDecision::no_update(*installed, Some(*latest)),
    }
}
