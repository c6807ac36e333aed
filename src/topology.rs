//! Cluster-topology input types for the query builder
//!
//! These mirror what a topology collaborator reads off a cluster object:
//! the control-plane pool, named worker pools, and the cluster-class
//! defaults that fill in OS constraints a pool leaves unset.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::query::OsConstraint;

/// A single machine pool as declared in the cluster topology
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolSpec {
    /// Pool-level OS constraint override; unset means "use the default"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsConstraint>,
}

impl MachinePoolSpec {
    /// A pool with no override of its own
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// A pool overriding its OS constraint
    pub fn with_os(os: OsConstraint) -> Self {
        Self { os: Some(os) }
    }
}

/// A cluster's declared topology: one control-plane pool plus zero or
/// more named worker pools
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTopology {
    /// The control-plane pool (always present)
    pub control_plane: MachinePoolSpec,

    /// Worker pools keyed by pool name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub workers: BTreeMap<String, MachinePoolSpec>,
}

/// Fallback OS constraints from the cluster class
///
/// A worker entry here both supplies the default constraint for the
/// same-named topology pool and declares the pool as defined; when any
/// worker entries exist, a topology pool without one is malformed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterClassDefaults {
    /// Default constraint for the control-plane pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<OsConstraint>,

    /// Default constraints for named worker pools
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub workers: BTreeMap<String, OsConstraint>,
}
