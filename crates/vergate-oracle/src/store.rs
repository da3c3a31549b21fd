use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use vergate_core::{RetrievalFailure, Version, VersionOracle};

use crate::http::{fetch_body, parse_url};

pub const PLAY_STORE_DETAILS_URL: &str = "https://play.google.com/store/apps/details";

static VERSION_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9.])([0-9]+\.[0-9]+\.[0-9]+)")
        .expect("version triple pattern should compile")
});

/// Scrapes a public store listing page for the published version.
#[derive(Debug, Clone)]
pub struct StoreListingOracle {
    client: reqwest::Client,
    details_url: String,
    locale: String,
    pattern: Regex,
}

impl StoreListingOracle {
    pub fn new(client: reqwest::Client, locale: impl Into<String>) -> Self {
        Self {
            client,
            details_url: PLAY_STORE_DETAILS_URL.to_string(),
            locale: locale.into(),
            pattern: VERSION_TRIPLE.clone(),
        }
    }

    /// Point the oracle at a different listing endpoint. The app id and locale
    /// are sent as `id` and `hl` query parameters.
    #[must_use]
    pub fn with_details_url(mut self, details_url: impl Into<String>) -> Self {
        self.details_url = details_url.into();
        self
    }

    /// Replace the version pattern. Capture group 1, or the whole match when
    /// the pattern has no group, must be a version triple.
    ///
    /// # Errors
    /// Returns an error when `pattern` is not a valid regular expression.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Regex::new(pattern)?;
        Ok(self)
    }

    /// The listing page for `app_id`, with the same query encoding used when
    /// scraping it. Hosts open this page as the update target.
    ///
    /// # Errors
    /// Returns a [`RetrievalFailure`] when the details URL is not a valid URL.
    pub fn listing_url(&self, app_id: &str) -> Result<Url, RetrievalFailure> {
        parse_url(
            &self.details_url,
            &[("id", app_id), ("hl", self.locale.as_str())],
        )
    }
}

#[async_trait]
impl VersionOracle for StoreListingOracle {
    fn name(&self) -> &'static str {
        "store listing"
    }

    async fn latest_version(&self, app_id: &str) -> Result<Version, RetrievalFailure> {
        let url = self.listing_url(app_id)?;
        let body = fetch_body(&self.client, url).await?;

        extract_version(&body, &self.pattern).ok_or_else(|| {
            RetrievalFailure::unexpected_format(format!(
                "no version found in store listing for {app_id} ({} bytes)",
                body.len()
            ))
        })
    }
}

/// First version triple in `body` matched by `pattern`.
pub(crate) fn extract_version(body: &str, pattern: &Regex) -> Option<Version> {
    pattern.captures_iter(body).find_map(|captures| {
        let matched = captures.get(1).or_else(|| captures.get(0))?;
        vergate_core::parse(matched.as_str()).ok()
    })
}
