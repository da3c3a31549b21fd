use std::time::Duration;

use log::{debug, warn};

use crate::failure::RetrievalFailure;
use crate::traits::VersionOracle;
use crate::version::Version;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout and retry schedule for latest-version retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPolicy {
    pub attempt_timeout: Duration,
    /// Delay before each attempt. An empty list behaves like `[0]`.
    pub retry_delays: Vec<Duration>,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            retry_delays: vec![Duration::ZERO],
        }
    }
}

impl RetrievalPolicy {
    #[must_use]
    pub fn from_secs(attempt_timeout_secs: u64, retry_delays_secs: &[u64]) -> Self {
        Self {
            attempt_timeout: Duration::from_secs(attempt_timeout_secs),
            retry_delays: retry_delays_secs
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
        }
    }

    fn delays(&self) -> &[Duration] {
        if self.retry_delays.is_empty() {
            &[Duration::ZERO]
        } else {
            &self.retry_delays
        }
    }
}

/// Ask `oracle` once for the latest version of `app_id`, bounded by the
/// default timeout.
///
/// # Errors
/// Returns a [`RetrievalFailure`] when the oracle fails or does not answer in
/// time.
pub async fn fetch_latest(
    app_id: &str,
    oracle: &dyn VersionOracle,
) -> Result<Version, RetrievalFailure> {
    fetch_latest_with_policy(app_id, oracle, &RetrievalPolicy::default()).await
}

/// Ask `oracle` for the latest version following `policy`.
///
/// Failures with a non-retryable reason end the loop early; otherwise the
/// last failure is returned once every attempt is used.
///
/// # Errors
/// Returns the last [`RetrievalFailure`] seen.
pub async fn fetch_latest_with_policy(
    app_id: &str,
    oracle: &dyn VersionOracle,
    policy: &RetrievalPolicy,
) -> Result<Version, RetrievalFailure> {
    let delays = policy.delays();
    let mut last_failure = None;

    for (attempt, delay) in delays.iter().enumerate() {
        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }

        match attempt_once(app_id, oracle, policy.attempt_timeout).await {
            Ok(version) => {
                debug!("{} reported {version} for {app_id}", oracle.name());
                return Ok(version);
            }
            Err(failure) => {
                debug!(
                    "{} attempt {} for {app_id} failed: {failure}",
                    oracle.name(),
                    attempt + 1
                );
                let retryable = failure.reason.is_retryable();
                last_failure = Some(failure);
                if !retryable {
                    break;
                }
            }
        }
    }

    let failure = last_failure
        .unwrap_or_else(|| RetrievalFailure::network("no retrieval attempt was made"));
    warn!(
        "Could not determine latest version of {app_id} via {}: {failure}",
        oracle.name()
    );
    Err(failure)
}

async fn attempt_once(
    app_id: &str,
    oracle: &dyn VersionOracle,
    timeout: Duration,
) -> Result<Version, RetrievalFailure> {
    match tokio::time::timeout(timeout, oracle.latest_version(app_id)).await {
        Ok(result) => result,
        Err(_) => Err(RetrievalFailure::timeout(format!(
            "{} gave no answer within {timeout:?}",
            oracle.name()
        ))),
    }
}
