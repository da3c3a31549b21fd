//! HTTP version oracles for vergate.
//!
//! Every oracle maps transport problems onto [`vergate_core::RetrievalFailure`]
//! reasons so the gate can fail open.

mod backend;
mod github;
mod http;
mod store;

pub use backend::BackendApiOracle;
pub use github::{GITHUB_API_URL, GitHubRelease, GitHubReleaseOracle};
pub use http::{ClientBuildError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HTTP_TIMEOUT, build_client};
pub use store::{PLAY_STORE_DETAILS_URL, StoreListingOracle};
