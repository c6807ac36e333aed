//! Strata - release and machine-image resolution for cluster lifecycle tooling
//!
//! Strata decides which concrete, versioned artifacts satisfy a cluster's
//! declared version and topology constraints: a Kubernetes distribution
//! release plus the matching machine image for the cluster's infrastructure
//! provider, per machine pool. It also computes which further upgrades are
//! legal from a version currently in use.
//!
//! # Architecture
//!
//! The engine is a pure function over an in-memory catalog and a query,
//! plus a generation-keyed cache that stays consistent as the catalog is
//! mutated:
//! - An ingestion collaborator populates the [`Catalog`] with release and
//!   image records it discovers.
//! - [`construct_query`] turns a cluster's declared topology into a
//!   [`Query`].
//! - [`Resolver::resolve`] matches the query against the catalog,
//!   producing a [`Resolution`] with one entry per machine pool.
//! - The [`upgrade`] module annotates releases with compatibility and
//!   updates-available conditions and computes legal upgrade steps, which
//!   a status collaborator writes back onto cluster objects.
//!
//! Strata never provisions infrastructure, persists results, watches live
//! objects, or downloads artifacts, and it owns no threads or timers.
//!
//! # Modules
//!
//! - [`catalog`] - Candidate catalog of release and image records
//! - [`query`] - Resolution queries and the query builder
//! - [`topology`] - Cluster-topology input types
//! - [`resolver`] - The core matching algorithm and its cache
//! - [`upgrade`] - Compatibility gating and upgrade-path computation
//! - [`version`] - Kubernetes-flavoured semantic version handling
//! - [`error`] - Error types for the engine

#![deny(missing_docs)]

pub mod catalog;
pub mod error;
pub mod query;
pub mod resolver;
pub mod topology;
pub mod upgrade;
pub mod version;

pub use catalog::Catalog;
pub use error::Error;
pub use query::{construct_query, OsConstraint, Query, VersionSelector};
pub use resolver::{PoolResolution, Resolution, Resolver};
pub use version::ReleaseVersion;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Reserved Names
// =============================================================================
// Reserved label/annotation keys and sentinel strings shared between the
// engine and its collaborators. Centralizing them here keeps ingestion,
// resolution, and status reporting in agreement.

/// Desired-version sentinel selecting the catalog's designated default release
pub const DEFAULT_VERSION_SENTINEL: &str = "default";

/// Reserved release label marking a release as incompatible
pub const INCOMPATIBLE_LABEL_KEY: &str = "strata.io/incompatible";

/// Reserved release label naming the component managing the release record
pub const MANAGED_BY_LABEL_KEY: &str = "strata.io/managed-by";

/// Cluster annotation advertising upgrade target versions (comma-separated)
pub const AVAILABLE_UPGRADES_ANNOTATION: &str = "strata.io/available-upgrades";

/// Condition type advertising that newer compatible releases exist
pub const UPDATES_AVAILABLE_CONDITION: &str = "UpdatesAvailable";
