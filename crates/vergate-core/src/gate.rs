use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::decision::{UpdateBehavior, UpdateDecision, decide_with_behavior};
use crate::retrieval::{RetrievalPolicy, fetch_latest_with_policy};
use crate::traits::{DecisionConsumer, Remediation, VersionOracle, VersionSource};
use crate::version::{VersionParseError, parse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Installed version is not usable: {0}")]
    InstalledVersion(#[from] VersionParseError),
}

/// Deferred remediation action handed to a [`DecisionConsumer`].
///
/// Invoking it starts the remediation on the runtime and returns at once.
#[derive(Clone)]
pub struct RemediationHandle {
    remediation: Arc<dyn Remediation>,
    runtime: tokio::runtime::Handle,
}

impl RemediationHandle {
    #[must_use]
    pub fn describe(&self) -> String {
        self.remediation.describe()
    }

    pub fn invoke(&self) -> JoinHandle<()> {
        let remediation = Arc::clone(&self.remediation);
        self.runtime.spawn(async move {
            let target = remediation.describe();
            match remediation.remediate().await {
                Ok(()) => info!("Started remediation: {target}"),
                Err(error) => warn!("Remediation failed ({target}): {error}"),
            }
        })
    }
}

impl std::fmt::Debug for RemediationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemediationHandle")
            .field("remediation", &self.remediation.describe())
            .finish_non_exhaustive()
    }
}

/// Decides whether the running application must be updated.
///
/// Holds no mutable state; concurrent checks need no coordination.
#[derive(Clone)]
pub struct VersionGate {
    app_id: String,
    source: Arc<dyn VersionSource>,
    oracle: Arc<dyn VersionOracle>,
    remediation: Arc<dyn Remediation>,
    policy: RetrievalPolicy,
    behavior: UpdateBehavior,
}

impl VersionGate {
    pub fn new(
        app_id: impl Into<String>,
        source: Arc<dyn VersionSource>,
        oracle: Arc<dyn VersionOracle>,
        remediation: Arc<dyn Remediation>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            source,
            oracle,
            remediation,
            policy: RetrievalPolicy::default(),
            behavior: UpdateBehavior::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetrievalPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: UpdateBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn behavior(&self) -> UpdateBehavior {
        self.behavior
    }

    /// Run one update check.
    ///
    /// # Errors
    /// Returns [`GateError::InstalledVersion`] when the installed version
    /// cannot be parsed. Retrieval problems are not errors: they produce a
    /// `NoUpdateNeeded` decision.
    pub async fn check(&self) -> Result<UpdateDecision, GateError> {
        let raw = self.source.installed_version();
        let installed =
            parse(raw.trim()).map_err(|_| VersionParseError::Malformed { raw: raw.clone() })?;

        if self.behavior == UpdateBehavior::DoNotCheck {
            debug!("Update checks disabled for {}", self.app_id);
            return Ok(UpdateDecision::no_update(installed, None));
        }

        let latest =
            fetch_latest_with_policy(&self.app_id, self.oracle.as_ref(), &self.policy).await;
        let decision = decide_with_behavior(&installed, &latest, self.behavior);
        match decision.latest {
            Some(latest) if decision.is_update_available() => info!(
                "{} {installed} is outdated, latest is {latest} (forced: {})",
                self.app_id, decision.forced
            ),
            _ => debug!("{} {installed} needs no update", self.app_id),
        }
        Ok(decision)
    }

    /// Run one check and hand the decision to `consumer`.
    ///
    /// # Errors
    /// Same as [`VersionGate::check`]; the consumer is not called on error.
    pub async fn run<C>(&self, consumer: &mut C) -> Result<UpdateDecision, GateError>
    where
        C: DecisionConsumer + ?Sized,
    {
        let decision = self.check().await?;
        consumer.on_decision(&decision, self.remediation_handle());
        Ok(decision)
    }

    fn remediation_handle(&self) -> RemediationHandle {
        RemediationHandle {
            remediation: Arc::clone(&self.remediation),
            runtime: tokio::runtime::Handle::current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::decision::UpdateKind;
    use crate::failure::RetrievalFailure;
    use crate::traits::{RemediationError, StaticVersionSource};
    use crate::version::Version;

    struct MockOracle {
        outcome: Result<Version, RetrievalFailure>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl MockOracle {
        fn answering(raw: &str) -> Self {
            Self {
                outcome: Ok(raw.parse().expect("valid version in test")),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn failing(failure: RetrievalFailure) -> Self {
            Self {
                outcome: Err(failure),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn hanging() -> Self {
            Self {
                outcome: Ok(Version::new(99, 0, 0)),
                calls: AtomicUsize::new(0),
                delay: Duration::from_secs(30),
            }
        }
    }

    #[async_trait]
    impl VersionOracle for MockOracle {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn latest_version(&self, _app_id: &str) -> Result<Version, RetrievalFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct MockRemediation {
        invoked: AtomicUsize,
        release: Notify,
        finished: AtomicUsize,
    }

    #[async_trait]
    impl Remediation for MockRemediation {
        fn describe(&self) -> String {
            "open store listing".to_string()
        }

        async fn remediate(&self) -> Result<(), RemediationError> {
            self.invoked.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingConsumer {
        decisions: Vec<UpdateDecision>,
        handles: Vec<RemediationHandle>,
    }

    impl DecisionConsumer for RecordingConsumer {
        fn on_decision(&mut self, decision: &UpdateDecision, remediate: RemediationHandle) {
            self.decisions.push(decision.clone());
            self.handles.push(remediate);
        }
    }

    fn gate(installed: &str, oracle: Arc<MockOracle>) -> VersionGate {
        VersionGate::new(
            "com.example.app",
            Arc::new(StaticVersionSource::new(installed)),
            oracle,
            Arc::new(MockRemediation::default()),
        )
        .with_policy(RetrievalPolicy {
            attempt_timeout: Duration::from_millis(50),
            retry_delays: vec![Duration::ZERO],
        })
    }

    #[tokio::test]
    async fn outdated_install_gets_forced_update() {
        let gate = gate("1.2.0", Arc::new(MockOracle::answering("1.3.0")));

        let decision = gate.check().await.expect("installed version is valid");

        assert_eq!(decision.kind, UpdateKind::UpdateAvailable);
        assert!(decision.forced);
        assert_eq!(decision.latest, Some(Version::new(1, 3, 0)));
    }

    #[tokio::test]
    async fn oracle_timeout_fails_open() {
        let gate = gate("1.2.0", Arc::new(MockOracle::hanging()));

        let decision = gate.check().await.expect("installed version is valid");

        assert_eq!(decision.kind, UpdateKind::NoUpdateNeeded);
        assert!(!decision.forced);
        assert_eq!(decision.latest, None);
    }

    #[tokio::test]
    async fn oracle_failure_fails_open() {
        let gate = gate(
            "1.2.0",
            Arc::new(MockOracle::failing(RetrievalFailure::bad_status("HTTP 404"))),
        );

        let decision = gate.check().await.expect("installed version is valid");

        assert_eq!(decision.kind, UpdateKind::NoUpdateNeeded);
    }

    #[tokio::test]
    async fn malformed_installed_version_is_reported_not_panicked() {
        let oracle = Arc::new(MockOracle::answering("1.3.0"));
        let gate = gate("1.2", Arc::clone(&oracle));

        let result = gate.check().await;

        assert_eq!(
            result,
            Err(GateError::InstalledVersion(VersionParseError::Malformed {
                raw: "1.2".to_string()
            }))
        );
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn installed_version_surrounding_whitespace_is_ignored() {
        let gate = gate(" 1.3.0\n", Arc::new(MockOracle::answering("1.3.0")));

        let decision = gate.check().await.expect("trimmed version is valid");

        assert_eq!(decision.installed, Version::new(1, 3, 0));
        assert_eq!(decision.kind, UpdateKind::NoUpdateNeeded);
    }

    #[tokio::test]
    async fn malformed_installed_version_error_keeps_untrimmed_input() {
        let gate = gate("  1.2 \n", Arc::new(MockOracle::answering("1.3.0")));

        let error = gate.check().await.expect_err("1.2 is not a triple");

        let GateError::InstalledVersion(parse_error) = error;
        assert_eq!(parse_error.raw(), "  1.2 \n");
    }

    #[tokio::test]
    async fn do_not_check_skips_the_oracle() {
        let oracle = Arc::new(MockOracle::answering("9.0.0"));
        let gate = gate("1.0.0", Arc::clone(&oracle)).with_behavior(UpdateBehavior::DoNotCheck);

        let decision = gate.check().await.expect("installed version is valid");

        assert_eq!(decision.kind, UpdateKind::NoUpdateNeeded);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn notify_behavior_reports_optional_update() {
        let gate = gate("1.0.0", Arc::new(MockOracle::answering("1.0.1")))
            .with_behavior(UpdateBehavior::Notify);

        let decision = gate.check().await.expect("installed version is valid");

        assert!(decision.is_update_available());
        assert!(!decision.forced);
    }

    #[tokio::test]
    async fn run_hands_decision_and_remediation_to_consumer() {
        let gate = gate("1.2.0", Arc::new(MockOracle::answering("1.3.0")));
        let mut consumer = RecordingConsumer::default();

        let decision = gate.run(&mut consumer).await.expect("check succeeds");

        assert_eq!(consumer.decisions, vec![decision]);
        assert_eq!(consumer.handles[0].describe(), "open store listing");
    }

    #[tokio::test]
    async fn run_skips_consumer_on_error() {
        let gate = gate("not-a-version", Arc::new(MockOracle::answering("1.3.0")));
        let mut consumer = RecordingConsumer::default();

        assert!(gate.run(&mut consumer).await.is_err());
        assert!(consumer.decisions.is_empty());
    }

    #[tokio::test]
    async fn invoking_remediation_does_not_wait_for_completion() {
        let remediation = Arc::new(MockRemediation::default());
        let gate = VersionGate::new(
            "com.example.app",
            Arc::new(StaticVersionSource::new("1.0.0")),
            Arc::new(MockOracle::answering("2.0.0")),
            Arc::clone(&remediation) as Arc<dyn Remediation>,
        );
        let mut consumer = RecordingConsumer::default();
        gate.run(&mut consumer).await.expect("check succeeds");

        let task = consumer.handles[0].invoke();
        tokio::task::yield_now().await;
        assert_eq!(remediation.finished.load(Ordering::SeqCst), 0);

        remediation.release.notify_one();
        task.await.expect("remediation task should not panic");
        assert_eq!(remediation.invoked.load(Ordering::SeqCst), 1);
        assert_eq!(remediation.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_checks_are_independent() {
        let oracle = Arc::new(MockOracle::answering("1.3.0"));
        let gate = gate("1.2.0", Arc::clone(&oracle));

        let checks = (0..8).map(|_| {
            let gate = gate.clone();
            async move { gate.check().await }
        });
        let decisions = futures_util::future::join_all(checks).await;

        assert_eq!(decisions.len(), 8);
        assert!(
            decisions
                .iter()
                .all(|d| d.as_ref().is_ok_and(UpdateDecision::is_update_available))
        );
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 8);
    }
}
