use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An application release as a `major.minor.patch` triple.
///
/// Ordering is numeric per component, so `10.0.0` sorts after `9.9.9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected X.Y.Z version, got: {raw:?}")]
    Malformed { raw: String },
}

impl VersionParseError {
    fn malformed(raw: &str) -> Self {
        Self::Malformed {
            raw: raw.to_string(),
        }
    }

    /// The input that failed to parse.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Malformed { raw } => raw,
        }
    }
}

impl Version {
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a release tag such as `v1.4.0`.
    ///
    /// Surrounding whitespace and a single leading `v` are ignored; the rest
    /// must be a strict triple.
    ///
    /// # Errors
    /// Returns [`VersionParseError::Malformed`] carrying the original tag.
    pub fn from_tag(tag: &str) -> Result<Self, VersionParseError> {
        let trimmed = tag.trim();
        let core = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        parse(core).map_err(|_| VersionParseError::malformed(tag))
    }
}

/// Parse a strict `\d+\.\d+\.\d+` version string.
///
/// # Errors
/// Returns [`VersionParseError::Malformed`] for a missing or extra component,
/// a non-digit character (including signs and whitespace), or a component
/// that does not fit in a `u64`.
pub fn parse(raw: &str) -> Result<Version, VersionParseError> {
    let mut parts = raw.split('.');

    let major = parse_component(parts.next()).ok_or_else(|| VersionParseError::malformed(raw))?;
    let minor = parse_component(parts.next()).ok_or_else(|| VersionParseError::malformed(raw))?;
    let patch = parse_component(parts.next()).ok_or_else(|| VersionParseError::malformed(raw))?;

    if parts.next().is_some() {
        return Err(VersionParseError::malformed(raw));
    }

    Ok(Version::new(major, minor, patch))
}

fn parse_component(part: Option<&str>) -> Option<u64> {
    let part = part?;
    // u64::from_str accepts a leading '+', which is not a valid component.
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Compare two versions component-wise: major, then minor, then patch.
#[must_use]
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
