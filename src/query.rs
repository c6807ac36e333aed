//! Resolution queries and the query builder
//!
//! `construct_query` turns a cluster's declared topology into a fully
//! populated [`Query`]: the `"default"` sentinel becomes a typed variant,
//! and every pool ends up with exactly one resolved OS constraint
//! (pool-level override wins, else the cluster-class default, else
//! "don't care").

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{OsDescriptor, ProviderKind};
use crate::topology::{ClusterClassDefaults, ClusterTopology};
use crate::version::ReleaseVersion;
use crate::{Error, Result, DEFAULT_VERSION_SENTINEL};

/// Per-pool OS constraint; an unset component matches anything
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct OsConstraint {
    /// Required OS name, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Required OS version, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Required CPU architecture, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl OsConstraint {
    /// Build a constraint from optional components
    pub fn new(name: Option<&str>, version: Option<&str>, arch: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            version: version.map(str::to_string),
            arch: arch.map(str::to_string),
        }
    }

    /// The "don't care" constraint that matches every image
    pub fn any() -> Self {
        Self::default()
    }

    /// Component-wise match against an image's OS descriptor
    pub fn matches(&self, os: &OsDescriptor) -> bool {
        fn component(want: &Option<String>, have: &str) -> bool {
            match want {
                Some(want) => want == have,
                None => true,
            }
        }
        component(&self.name, &os.name)
            && component(&self.version, &os.version)
            && component(&self.arch, &os.arch)
    }
}

/// Which release a query asks for
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum VersionSelector {
    /// The catalog's currently designated default release
    Default,
    /// The release with exactly this semantic version
    Exact(ReleaseVersion),
}

/// A resolution request derived from a cluster's topology
///
/// Immutable once built; hashing feeds the resolver's cache key, so equal
/// queries against the same catalog generation share a cached result.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Desired release selector
    pub desired_version: VersionSelector,

    /// Provider identity of the cluster being resolved
    pub provider: ProviderKind,

    /// Resolved constraint for the control-plane pool
    pub control_plane: OsConstraint,

    /// Resolved constraints for worker pools, keyed by pool name
    pub workers: BTreeMap<String, OsConstraint>,
}

/// Build a query from a desired version and a cluster's topology
///
/// Fails with [`Error::MalformedTopology`] when the desired version is
/// neither the `"default"` sentinel nor a valid semantic version, or when
/// the topology names a worker pool the cluster class never defined.
pub fn construct_query(
    desired_version: &str,
    provider: ProviderKind,
    topology: &ClusterTopology,
    defaults: &ClusterClassDefaults,
) -> Result<Query> {
    let desired_version = if desired_version == DEFAULT_VERSION_SENTINEL {
        VersionSelector::Default
    } else {
        let version = ReleaseVersion::parse(desired_version).map_err(|_| {
            Error::malformed_topology(format!(
                "desired version '{desired_version}' is neither the \
                 '{DEFAULT_VERSION_SENTINEL}' sentinel nor a semantic version"
            ))
        })?;
        VersionSelector::Exact(version)
    };

    let control_plane = topology
        .control_plane
        .os
        .clone()
        .or_else(|| defaults.control_plane.clone())
        .unwrap_or_default();

    let mut workers = BTreeMap::new();
    for (name, pool) in &topology.workers {
        let default = defaults.workers.get(name).cloned();
        // A cluster class that defines named worker pools must define all
        // pools the topology uses.
        if default.is_none() && !defaults.workers.is_empty() {
            return Err(Error::malformed_topology(format!(
                "worker pool '{name}' has no corresponding clusterClass definition"
            )));
        }
        let constraint = pool.os.clone().or(default).unwrap_or_default();
        workers.insert(name.clone(), constraint);
    }

    Ok(Query {
        desired_version,
        provider,
        control_plane,
        workers,
    })
}
