use std::fmt;

use thiserror::Error;

/// Why the latest published version could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    Network,
    BadStatus,
    UnexpectedFormat,
    Timeout,
}

impl FailureReason {
    pub const ALL: [Self; 4] = [
        Self::Network,
        Self::BadStatus,
        Self::UnexpectedFormat,
        Self::Timeout,
    ];

    /// A well-formed answer in the wrong shape will not change on retry.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::UnexpectedFormat)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::BadStatus => "bad status",
            Self::UnexpectedFormat => "unexpected format",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable failure to retrieve the latest version.
///
/// Callers treat this as "cannot determine" and never force an update on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("latest version unavailable ({reason}): {detail}")]
pub struct RetrievalFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl RetrievalFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Network, detail)
    }

    pub fn bad_status(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::BadStatus, detail)
    }

    pub fn unexpected_format(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::UnexpectedFormat, detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(FailureReason::Timeout, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureReason, RetrievalFailure};

    #[test]
    fn display_includes_reason_and_detail() {
        let failure = RetrievalFailure::bad_status("HTTP 503 Service Unavailable");

        assert_eq!(
            failure.to_string(),
            "latest version unavailable (bad status): HTTP 503 Service Unavailable"
        );
    }

    #[test]
    fn only_unexpected_format_is_not_retryable() {
        for reason in FailureReason::ALL {
            assert_eq!(
                reason.is_retryable(),
                reason != FailureReason::UnexpectedFormat,
                "{reason}"
            );
        }
    }

    #[test]
    fn helpers_set_expected_reason() {
        assert_eq!(RetrievalFailure::network("x").reason, FailureReason::Network);
        assert_eq!(RetrievalFailure::timeout("x").reason, FailureReason::Timeout);
        assert_eq!(
            RetrievalFailure::unexpected_format("x").reason,
            FailureReason::UnexpectedFormat
        );
    }
}
