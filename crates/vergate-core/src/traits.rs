use async_trait::async_trait;
use thiserror::Error;

use crate::decision::UpdateDecision;
use crate::failure::RetrievalFailure;
use crate::gate::RemediationHandle;
use crate::version::Version;

/// Reports the version of the running application.
pub trait VersionSource: Send + Sync {
    fn installed_version(&self) -> String;
}

/// Fixed installed version, typically `env!("CARGO_PKG_VERSION")` of the host.
#[derive(Debug, Clone)]
pub struct StaticVersionSource {
    version: String,
}

impl StaticVersionSource {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl VersionSource for StaticVersionSource {
    fn installed_version(&self) -> String {
        self.version.clone()
    }
}

/// Source of truth for the latest published version of an application.
#[async_trait]
pub trait VersionOracle: Send + Sync {
    fn name(&self) -> &'static str;

    async fn latest_version(&self, app_id: &str) -> Result<Version, RetrievalFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemediationError {
    #[error("Failed to open {target}: {details}")]
    OpenFailed { target: String, details: String },

    #[error("Remediation not supported on this platform: {operation}")]
    Unsupported { operation: &'static str },

    #[error("Update flow failed: {0}")]
    Failed(String),
}

/// Sends the user to wherever the update can be installed.
#[async_trait]
pub trait Remediation: Send + Sync {
    fn describe(&self) -> String;

    async fn remediate(&self) -> Result<(), RemediationError>;
}

/// Presentation layer that receives each decision.
///
/// For an `UpdateAvailable` decision the consumer shows a prompt whose action
/// calls [`RemediationHandle::invoke`]. When `decision.forced` is set the
/// prompt must not be dismissible.
pub trait DecisionConsumer {
    fn on_decision(&mut self, decision: &UpdateDecision, remediate: RemediationHandle);
}
