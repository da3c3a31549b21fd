//! Version gate core for vergate.
//!
//! This crate holds the logic that does not depend on any transport or UI:
//! - Version parsing and numeric comparison.
//! - The update decision, including fail-open handling of retrieval failures.
//! - Retrieval orchestration (timeout and bounded retry) over a version oracle.
//! - The capability traits a host plugs in, and the gate that composes them.

mod decision;
mod failure;
mod gate;
mod retrieval;
mod traits;
mod version;

/// Update decision model and the pure decision functions.
pub use decision::{UpdateBehavior, UpdateDecision, UpdateKind, decide, decide_with_behavior};
/// Typed retrieval failure and its reason tags.
pub use failure::{FailureReason, RetrievalFailure};
/// Gate composing a version source, an oracle and a remediation target.
pub use gate::{GateError, RemediationHandle, VersionGate};
/// Latest-version retrieval with timeout and retry policy.
pub use retrieval::{
    DEFAULT_ATTEMPT_TIMEOUT, RetrievalPolicy, fetch_latest, fetch_latest_with_policy,
};
/// Capability seams implemented by hosts and oracle crates.
pub use traits::{
    DecisionConsumer, Remediation, RemediationError, StaticVersionSource, VersionOracle,
    VersionSource,
};
/// Version model, parser and comparison.
pub use version::{Version, VersionParseError, compare, parse};
