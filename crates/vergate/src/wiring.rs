use std::sync::Arc;
use std::time::Duration;

use vergate_core::{Remediation, RetrievalPolicy, StaticVersionSource, VersionGate, VersionOracle};
use vergate_oracle::{BackendApiOracle, GitHubReleaseOracle, StoreListingOracle, build_client};
use vergate_platform::{CommandUpdateTrigger, FallbackRemediation, NativeUpdate, OpenStoreListing};

use crate::error::AppError;
use crate::settings::{AppSettings, OracleSettings};

/// Assemble a gate from settings. `installed` is used unless the settings
/// override it.
pub fn build_gate(settings: &AppSettings, installed: &str) -> Result<VersionGate, AppError> {
    let needs_app_id = !matches!(settings.oracle, OracleSettings::GitHub { .. });
    if needs_app_id && settings.app_id.trim().is_empty() {
        return Err(AppError::missing_setting("app_id"));
    }

    let (oracle, default_store_url) = build_oracle(settings)?;

    let store_url = settings
        .store_url
        .clone()
        .or(default_store_url)
        .ok_or_else(|| AppError::missing_setting("store_url"))?;
    let remediation = build_remediation(settings, store_url)?;

    let installed = settings
        .installed_version_override
        .clone()
        .unwrap_or_else(|| installed.to_string());

    Ok(VersionGate::new(
        settings.app_id.clone(),
        Arc::new(StaticVersionSource::new(installed)),
        oracle,
        remediation,
    )
    .with_policy(RetrievalPolicy::from_secs(
        settings.http_timeout_secs,
        &settings.retry_delays_secs,
    ))
    .with_behavior(settings.update_behavior))
}

/// The version oracle named by the settings, with the store page it implies
/// when the settings do not name one.
fn build_oracle(
    settings: &AppSettings,
) -> Result<(Arc<dyn VersionOracle>, Option<String>), AppError> {
    let client = build_client(
        Duration::from_secs(settings.http_timeout_secs),
        Duration::from_secs(settings.connect_timeout_secs),
    )
    .map_err(AppError::http_client_failed)?;

    let built: (Arc<dyn VersionOracle>, Option<String>) = match &settings.oracle {
        OracleSettings::Store { locale, pattern } => {
            let mut oracle = StoreListingOracle::new(client, locale.clone());
            if let Some(pattern) = pattern {
                oracle = oracle
                    .with_pattern(pattern)
                    .map_err(|error| AppError::invalid_setting("oracle.pattern", error))?;
            }
            let listing = oracle
                .listing_url(&settings.app_id)
                .map_err(|failure| AppError::invalid_setting("app_id", failure.to_string()))?;
            (Arc::new(oracle), Some(listing.to_string()))
        }
        OracleSettings::Backend {
            endpoint,
            version_field,
        } => {
            let mut oracle = BackendApiOracle::new(client, endpoint.clone());
            if let Some(field) = version_field {
                oracle = oracle.with_version_field(field.clone());
            }
            (Arc::new(oracle), None)
        }
        OracleSettings::GitHub { repo } => {
            let oracle = GitHubReleaseOracle::new(client, repo.clone());
            let release_page = oracle.release_page_url();
            (Arc::new(oracle), Some(release_page))
        }
    };
    Ok(built)
}

/// Store page remediation, preceded by the native update command when one is
/// configured.
fn build_remediation(
    settings: &AppSettings,
    store_url: String,
) -> Result<Arc<dyn Remediation>, AppError> {
    let store: Arc<dyn Remediation> = Arc::new(OpenStoreListing::new(store_url));
    let Some(argv) = &settings.native_update_command else {
        return Ok(store);
    };

    let trigger = CommandUpdateTrigger::from_argv(argv).ok_or_else(|| {
        AppError::invalid_setting("native_update_command", "no program given".to_string())
    })?;
    Ok(Arc::new(FallbackRemediation::new(
        Arc::new(NativeUpdate::new(Arc::new(trigger))),
        store,
    )))
}
