use async_trait::async_trait;
use serde::Deserialize;
use vergate_core::{RetrievalFailure, Version, VersionOracle};

use crate::http::{fetch_body, parse_url};

pub const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub html_url: String,
}

/// Reads the latest published GitHub release of a repository.
///
/// The app id passed by the gate is ignored; the repository identifies the
/// application.
#[derive(Debug, Clone)]
pub struct GitHubReleaseOracle {
    client: reqwest::Client,
    repo: String,
    api_url: String,
}

impl GitHubReleaseOracle {
    pub fn new(client: reqwest::Client, repo: impl Into<String>) -> Self {
        Self {
            client,
            repo: repo.into(),
            api_url: GITHUB_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Browser page of the latest release, usable as a remediation target.
    #[must_use]
    pub fn release_page_url(&self) -> String {
        format!("https://github.com/{}/releases/latest", self.repo)
    }

    /// Fetch the latest release metadata.
    ///
    /// # Errors
    /// Returns a [`RetrievalFailure`] when the request fails or the response
    /// is not a release object.
    pub async fn latest_release(&self) -> Result<GitHubRelease, RetrievalFailure> {
        let base = format!(
            "{}/repos/{}/releases/latest",
            self.api_url.trim_end_matches('/'),
            self.repo
        );
        let url = parse_url(&base, &[])?;
        let body = fetch_body(&self.client, url).await?;

        serde_json::from_str(&body).map_err(|error| {
            RetrievalFailure::unexpected_format(format!("invalid release response: {error}"))
        })
    }
}

#[async_trait]
impl VersionOracle for GitHubReleaseOracle {
    fn name(&self) -> &'static str {
        "github release"
    }

    async fn latest_version(&self, _app_id: &str) -> Result<Version, RetrievalFailure> {
        let release = self.latest_release().await?;
        version_from_release(&release)
    }
}

pub(crate) fn version_from_release(release: &GitHubRelease) -> Result<Version, RetrievalFailure> {
    Version::from_tag(&release.tag_name).map_err(|error| {
        RetrievalFailure::unexpected_format(format!(
            "release {} has no version tag: {error}",
            release.html_url
        ))
    })
}
