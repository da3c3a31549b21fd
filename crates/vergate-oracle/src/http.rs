use std::time::Duration;

use log::debug;
use reqwest::Url;
use vergate_core::RetrievalFailure;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const BODY_SNIPPET_CHARS: usize = 160;

#[derive(Debug, thiserror::Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[source] reqwest::Error);

/// Build the shared client used by every HTTP oracle.
///
/// # Errors
/// Returns an error if the TLS backend or client configuration cannot be
/// initialized.
pub fn build_client(
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client, ClientBuildError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(format!("vergate/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ClientBuildError)
}

pub(crate) fn parse_url(base: &str, params: &[(&str, &str)]) -> Result<Url, RetrievalFailure> {
    let parsed = if params.is_empty() {
        Url::parse(base)
    } else {
        Url::parse_with_params(base, params)
    };
    parsed.map_err(|error| RetrievalFailure::network(format!("invalid URL {base:?}: {error}")))
}

/// GET `url` and return the body of a successful response.
pub(crate) async fn fetch_body(
    client: &reqwest::Client,
    url: Url,
) -> Result<String, RetrievalFailure> {
    debug!("GET {url}");
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|error| classify(&url, &error))?;

    let status = response.status();
    if !status.is_success() {
        let body_snippet = response
            .text()
            .await
            .ok()
            .map(|body| response_snippet(&body, BODY_SNIPPET_CHARS))
            .unwrap_or_default();
        return Err(RetrievalFailure::bad_status(format!(
            "HTTP {status} from {url}{body_snippet}"
        )));
    }

    response
        .text()
        .await
        .map_err(|error| classify(&url, &error))
}

fn classify(url: &Url, error: &reqwest::Error) -> RetrievalFailure {
    if error.is_timeout() {
        RetrievalFailure::timeout(format!("request to {url} timed out: {error}"))
    } else {
        RetrievalFailure::network(format!("request to {url} failed: {error}"))
    }
}

pub(crate) fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.trim().chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}
