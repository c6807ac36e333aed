//! Release records and their compatibility/update conditions

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::version::ReleaseVersion;
use crate::{INCOMPATIBLE_LABEL_KEY, MANAGED_BY_LABEL_KEY};

/// Condition status following Kubernetes conventions
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Severity attached to a failing condition
///
/// Whether an incompatible release warrants Warning or Error severity is a
/// policy decision of the embedding program, passed explicitly into the
/// compatibility engine rather than baked in here.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionSeverity {
    /// Condition failure is informational
    #[default]
    Warning,
    /// Condition failure blocks normal use
    Error,
}

impl std::fmt::Display for ConditionSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Kubernetes-style condition for status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Condition {
    /// Type of condition (e.g., Compatible, UpdatesAvailable)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    pub reason: String,

    /// Human-readable message
    pub message: String,

    /// Last time the condition transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }
}

/// Tri-state compatibility of a release
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum Compatibility {
    /// Release is usable
    Compatible,
    /// Release is explicitly marked unusable
    Incompatible,
    /// Compatibility has not been determined yet
    #[default]
    Unknown,
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compatible => write!(f, "Compatible"),
            Self::Incompatible => write!(f, "Incompatible"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Compatibility condition attached to a release
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityCondition {
    /// Current compatibility state
    pub state: Compatibility,

    /// Machine-readable reason for the state
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Severity when the state is Incompatible
    #[serde(default)]
    pub severity: ConditionSeverity,
}

impl CompatibilityCondition {
    /// A compatible condition with the given reason
    pub fn compatible(reason: impl Into<String>) -> Self {
        Self {
            state: Compatibility::Compatible,
            reason: reason.into(),
            severity: ConditionSeverity::Warning,
        }
    }

    /// An incompatible condition with the given reason and severity
    pub fn incompatible(reason: impl Into<String>, severity: ConditionSeverity) -> Self {
        Self {
            state: Compatibility::Incompatible,
            reason: reason.into(),
            severity,
        }
    }
}

/// Updates-available condition attached to a release
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatesAvailableCondition {
    /// Whether any newer compatible release exists
    pub available: bool,

    /// Versions of newer compatible releases, ascending
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
}

/// A named, semantically versioned Kubernetes distribution descriptor
///
/// Releases are created and replaced by catalog population; the resolver
/// never mutates them. Two releases may share a semantic version under
/// different names (aliasing) — resolution breaks such ties
/// deterministically.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Unique release name
    pub name: String,

    /// Semantic version of the distribution
    pub version: ReleaseVersion,

    /// Free-form labels; reserved keys mark incompatibility and management
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Compatibility condition
    #[serde(default)]
    pub compatibility: CompatibilityCondition,

    /// Updates-available condition
    #[serde(default)]
    pub updates: UpdatesAvailableCondition,
}

impl Release {
    /// Create a release with no labels and unknown compatibility
    pub fn new(name: impl Into<String>, version: ReleaseVersion) -> Self {
        Self {
            name: name.into(),
            version,
            labels: BTreeMap::new(),
            compatibility: CompatibilityCondition::default(),
            updates: UpdatesAvailableCondition::default(),
        }
    }

    /// Attach labels to the release
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach one label to the release
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Attach a compatibility condition to the release
    pub fn with_compatibility(mut self, compatibility: CompatibilityCondition) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// True when the reserved incompatible label is present
    pub fn is_incompatible_labeled(&self) -> bool {
        self.labels.contains_key(INCOMPATIBLE_LABEL_KEY)
    }

    /// Value of the reserved managed-by label, if any
    pub fn managed_by(&self) -> Option<&str> {
        self.labels.get(MANAGED_BY_LABEL_KEY).map(String::as_str)
    }

    /// True unless the release is labeled incompatible or its condition is
    /// explicitly Incompatible
    pub fn is_compatible(&self) -> bool {
        !self.is_incompatible_labeled()
            && self.compatibility.state != Compatibility::Incompatible
    }
}
