use async_trait::async_trait;
use serde_json::Value;
use vergate_core::{RetrievalFailure, Version, VersionOracle};

use crate::http::{fetch_body, parse_url, response_snippet};

const DEFAULT_VERSION_FIELD: &str = "version";

/// Asks an application backend for the latest version.
///
/// The endpoint receives the app id as the `app_id` query parameter and
/// answers with either `{"version": "1.2.3"}` or a bare version string.
#[derive(Debug, Clone)]
pub struct BackendApiOracle {
    client: reqwest::Client,
    endpoint: String,
    version_field: String,
}

impl BackendApiOracle {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            version_field: DEFAULT_VERSION_FIELD.to_string(),
        }
    }

    #[must_use]
    pub fn with_version_field(mut self, field: impl Into<String>) -> Self {
        self.version_field = field.into();
        self
    }
}

#[async_trait]
impl VersionOracle for BackendApiOracle {
    fn name(&self) -> &'static str {
        "backend api"
    }

    async fn latest_version(&self, app_id: &str) -> Result<Version, RetrievalFailure> {
        let url = parse_url(&self.endpoint, &[("app_id", app_id)])?;
        let body = fetch_body(&self.client, url).await?;
        version_from_body(&body, &self.version_field)
    }
}

pub(crate) fn version_from_body(body: &str, field: &str) -> Result<Version, RetrievalFailure> {
    let raw = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get(field) {
            Some(Value::String(version)) => version.clone(),
            Some(other) => {
                return Err(RetrievalFailure::unexpected_format(format!(
                    "field {field:?} is not a string: {other}"
                )));
            }
            None => {
                return Err(RetrievalFailure::unexpected_format(format!(
                    "response has no {field:?} field"
                )));
            }
        },
        Ok(Value::String(version)) => version,
        _ => body.to_string(),
    };

    Version::from_tag(&raw).map_err(|_| {
        RetrievalFailure::unexpected_format(format!(
            "backend answered with no version{}",
            response_snippet(&raw, 80)
        ))
    })
}
