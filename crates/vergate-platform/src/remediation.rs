use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use vergate_core::{Remediation, RemediationError};

const APP_STORE_LISTING_URL: &str = "https://apps.apple.com/app";

/// App Store page for a numeric App Store id, or `None` when `app_store_id`
/// is not purely digits.
#[must_use]
pub fn app_store_listing_url(app_store_id: &str) -> Option<String> {
    let id = app_store_id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{APP_STORE_LISTING_URL}/id{id}"))
}

type UrlOpener = dyn Fn(&str) -> std::io::Result<()> + Send + Sync;

/// Opens a store listing (or release page) in the user's browser.
#[derive(Clone)]
pub struct OpenStoreListing {
    url: String,
    opener: Arc<UrlOpener>,
}

impl OpenStoreListing {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_opener(url, Arc::new(|url: &str| open::that_detached(url)))
    }

    pub fn with_opener(url: impl Into<String>, opener: Arc<UrlOpener>) -> Self {
        Self {
            url: url.into(),
            opener,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Remediation for OpenStoreListing {
    fn describe(&self) -> String {
        format!("open {}", self.url)
    }

    async fn remediate(&self) -> Result<(), RemediationError> {
        debug!("Opening {}", self.url);
        (self.opener)(&self.url).map_err(|error| RemediationError::OpenFailed {
            target: self.url.clone(),
            details: error.to_string(),
        })
    }
}

/// Host hook into the platform's own update mechanism.
#[async_trait]
pub trait NativeUpdateTrigger: Send + Sync {
    fn describe(&self) -> String {
        "start native update".to_string()
    }

    async fn start_update(&self) -> Result<(), String>;
}

/// Hands control to the platform's immediate-update flow.
#[derive(Clone)]
pub struct NativeUpdate {
    trigger: Option<Arc<dyn NativeUpdateTrigger>>,
}

impl NativeUpdate {
    pub fn new(trigger: Arc<dyn NativeUpdateTrigger>) -> Self {
        Self {
            trigger: Some(trigger),
        }
    }

    /// For platforms without a native flow; every attempt reports
    /// [`RemediationError::Unsupported`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self { trigger: None }
    }
}

#[async_trait]
impl Remediation for NativeUpdate {
    fn describe(&self) -> String {
        self.trigger.as_ref().map_or_else(
            || "start native update".to_string(),
            |trigger| trigger.describe(),
        )
    }

    async fn remediate(&self) -> Result<(), RemediationError> {
        let Some(trigger) = &self.trigger else {
            return Err(RemediationError::Unsupported {
                operation: "native update",
            });
        };
        trigger.start_update().await.map_err(RemediationError::Failed)
    }
}

/// Tries `primary` and falls back to `fallback` when it fails.
#[derive(Clone)]
pub struct FallbackRemediation {
    primary: Arc<dyn Remediation>,
    fallback: Arc<dyn Remediation>,
}

impl FallbackRemediation {
    pub fn new(primary: Arc<dyn Remediation>, fallback: Arc<dyn Remediation>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Remediation for FallbackRemediation {
    fn describe(&self) -> String {
        format!(
            "{}, falling back to {}",
            self.primary.describe(),
            self.fallback.describe()
        )
    }

    async fn remediate(&self) -> Result<(), RemediationError> {
        match self.primary.remediate().await {
            Ok(()) => Ok(()),
            Err(error) => {
                warn!(
                    "{} failed ({error}), trying {}",
                    self.primary.describe(),
                    self.fallback.describe()
                );
                self.fallback.remediate().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    #[cfg(unix)]
    use crate::commands::CommandUpdateTrigger;

    fn recording_opener() -> (Arc<Mutex<Vec<String>>>, Arc<UrlOpener>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&opened);
        let opener: Arc<UrlOpener> = Arc::new(move |url: &str| -> std::io::Result<()> {
            sink.lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(url.to_string());
            Ok(())
        });
        (opened, opener)
    }

    struct CountingTrigger {
        calls: AtomicUsize,
        outcome: Result<(), String>,
    }

    #[async_trait]
    impl NativeUpdateTrigger for CountingTrigger {
        async fn start_update(&self) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[test]
    fn app_store_url_uses_numeric_id() {
        assert_eq!(
            app_store_listing_url("1234567890").as_deref(),
            Some("https://apps.apple.com/app/id1234567890")
        );
        assert_eq!(app_store_listing_url("123 4"), None);
        assert_eq!(app_store_listing_url("../id1"), None);
        assert_eq!(app_store_listing_url(""), None);
    }

    #[tokio::test]
    async fn open_store_listing_passes_url_to_opener() {
        let (opened, opener) = recording_opener();
        let remediation = OpenStoreListing::with_opener("https://example.com/app", opener);

        remediation.remediate().await.expect("opener succeeds");

        assert_eq!(
            *opened.lock().expect("lock is not poisoned"),
            vec!["https://example.com/app".to_string()]
        );
        assert_eq!(remediation.describe(), "open https://example.com/app");
    }

    #[tokio::test]
    async fn open_failure_maps_to_open_failed() {
        let remediation = OpenStoreListing::with_opener(
            "https://example.com/app",
            Arc::new(|_: &str| -> std::io::Result<()> {
                Err(std::io::Error::other("no browser"))
            }),
        );

        let error = remediation.remediate().await.expect_err("opener fails");

        assert_eq!(
            error,
            RemediationError::OpenFailed {
                target: "https://example.com/app".to_string(),
                details: "no browser".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unavailable_native_update_is_unsupported() {
        let error = NativeUpdate::unavailable()
            .remediate()
            .await
            .expect_err("no trigger configured");

        assert!(matches!(error, RemediationError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn native_update_delegates_to_trigger() {
        let trigger = Arc::new(CountingTrigger {
            calls: AtomicUsize::new(0),
            outcome: Err("user cancelled".to_string()),
        });
        let remediation = NativeUpdate::new(Arc::clone(&trigger) as Arc<dyn NativeUpdateTrigger>);

        let error = remediation.remediate().await.expect_err("trigger fails");

        assert_eq!(error, RemediationError::Failed("user cancelled".to_string()));
        assert_eq!(trigger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_opens_store_when_native_update_fails() {
        let (opened, opener) = recording_opener();
        let remediation = FallbackRemediation::new(
            Arc::new(NativeUpdate::unavailable()),
            Arc::new(OpenStoreListing::with_opener(
                "https://example.com/app",
                opener,
            )),
        );

        remediation.remediate().await.expect("fallback succeeds");

        assert_eq!(opened.lock().expect("lock is not poisoned").len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn update_command_runs_before_store_listing() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let marker = temp_dir.path().join("update-attempted");
        let seen_marker = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen_marker);
        let marker_path = marker.clone();
        let opener: Arc<UrlOpener> = Arc::new(move |_: &str| -> std::io::Result<()> {
            sink.lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(marker_path.exists());
            Ok(())
        });
        let script = format!("touch '{}'; exit 1", marker.display());
        let remediation = FallbackRemediation::new(
            Arc::new(NativeUpdate::new(Arc::new(CommandUpdateTrigger::new(
                "sh",
                vec!["-c".to_string(), script],
            )))),
            Arc::new(OpenStoreListing::with_opener(
                "https://example.com/app",
                opener,
            )),
        );

        remediation.remediate().await.expect("store listing opens");

        assert_eq!(*seen_marker.lock().expect("lock is not poisoned"), vec![true]);
    }

    #[tokio::test]
    async fn fallback_is_skipped_when_primary_succeeds() {
        let (opened, opener) = recording_opener();
        let trigger = Arc::new(CountingTrigger {
            calls: AtomicUsize::new(0),
            outcome: Ok(()),
        });
        let remediation = FallbackRemediation::new(
            Arc::new(NativeUpdate::new(trigger)),
            Arc::new(OpenStoreListing::with_opener(
                "https://example.com/app",
                opener,
            )),
        );

        remediation.remediate().await.expect("primary succeeds");

        assert!(opened.lock().expect("lock is not poisoned").is_empty());
    }
}
