//! Error types for the strata resolution engine

use thiserror::Error;

/// Main error type for resolution operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The cluster topology references an undefined machine pool or carries
    /// an unparseable desired-version string
    #[error("malformed topology: {0}")]
    MalformedTopology(String),

    /// The requested exact version names no release in the catalog
    #[error("no matching release: {0}")]
    NoMatchingRelease(String),

    /// A version string failed semantic-version parsing
    #[error("version error: {0}")]
    Version(String),
}

impl Error {
    /// Create a malformed-topology error with the given message
    pub fn malformed_topology(msg: impl Into<String>) -> Self {
        Self::MalformedTopology(msg.into())
    }

    /// Create a no-matching-release error with the given message
    pub fn no_matching_release(msg: impl Into<String>) -> Self {
        Self::NoMatchingRelease(msg.into())
    }

    /// Create a version error with the given message
    pub fn version(msg: impl Into<String>) -> Self {
        Self::Version(msg.into())
    }
}
