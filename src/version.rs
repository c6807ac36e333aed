//! Kubernetes-flavoured semantic version handling
//!
//! Release versions arrive as strings like `v1.24.2` or `1.24.2`. This
//! module wraps `semver::Version` in a newtype that accepts the
//! conventional leading `v`, remembers the string as written for display,
//! and compares/hashes by the parsed version so `v1.24.2` and `1.24.2`
//! are the same version.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::Error;

/// A semantic version as used for release identity and ordering
#[derive(Clone, Debug)]
pub struct ReleaseVersion {
    raw: String,
    parsed: semver::Version,
}

impl ReleaseVersion {
    /// Parse a version string, accepting an optional leading `v`
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.strip_prefix('v').unwrap_or(s);
        let parsed = semver::Version::parse(trimmed)
            .map_err(|e| Error::version(format!("'{s}' is not a semantic version: {e}")))?;
        Ok(Self {
            raw: s.to_string(),
            parsed,
        })
    }

    /// The version string as originally written (prefix preserved)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Major version number
    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    /// Minor version number
    pub fn minor(&self) -> u64 {
        self.parsed.minor
    }

    /// Patch version number
    pub fn patch(&self) -> u64 {
        self.parsed.patch
    }

    /// The underlying parsed semantic version
    pub fn semver(&self) -> &semver::Version {
        &self.parsed
    }

    /// True when `other` is exactly one minor version below this version
    /// on the same major line; patch and pre-release are ignored
    pub fn is_one_minor_above(&self, other: &ReleaseVersion) -> bool {
        self.parsed.major == other.parsed.major
            && self.parsed.minor == other.parsed.minor + 1
    }
}

impl FromStr for ReleaseVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// Equality, ordering, and hashing go through the parsed version so that
// `v1.24.2` and `1.24.2` are interchangeable keys.
impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl Hash for ReleaseVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parsed.hash(state);
    }
}

impl serde::Serialize for ReleaseVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for ReleaseVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for ReleaseVersion {
    fn schema_name() -> String {
        "ReleaseVersion".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <String as schemars::JsonSchema>::json_schema(gen)
    }
}
