//! Machine-image records scoped to an infrastructure provider

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported infrastructure provider families
///
/// An image belongs to exactly one provider family; queries carry the
/// provider identity of the cluster being resolved.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Docker/Kind provider for local development
    #[default]
    Docker,
    /// Amazon Web Services
    Aws,
    /// Microsoft Azure
    Azure,
    /// VMware vSphere
    Vsphere,
    /// OpenStack private cloud
    OpenStack,
}

impl ProviderKind {
    /// Returns true if this is a valid provider kind string
    pub fn is_valid(s: &str) -> bool {
        matches!(
            s.to_lowercase().as_str(),
            "docker" | "aws" | "azure" | "vsphere" | "openstack"
        )
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "aws" => Ok(Self::Aws),
            "azure" => Ok(Self::Azure),
            "vsphere" => Ok(Self::Vsphere),
            "openstack" => Ok(Self::OpenStack),
            _ => Err(crate::Error::malformed_topology(format!(
                "invalid provider kind: {s}, expected one of: docker, aws, azure, vsphere, openstack"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Docker => write!(f, "docker"),
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Vsphere => write!(f, "vsphere"),
            Self::OpenStack => write!(f, "openstack"),
        }
    }
}

/// Operating-system descriptor attached to an image
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OsDescriptor {
    /// OS name (e.g., "ubuntu")
    pub name: String,
    /// OS version (e.g., "22.04")
    pub version: String,
    /// CPU architecture (e.g., "amd64")
    pub arch: String,
}

impl OsDescriptor {
    /// Create an OS descriptor
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            arch: arch.into(),
        }
    }
}

/// A named machine image valid for one or more releases on one provider
///
/// The `reference` is an opaque provider-specific locator: an AMI id on
/// AWS, a VM template path on vSphere, a disk image URN on Azure. The
/// engine never dereferences it.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image name, unique within its provider family
    pub name: String,

    /// Provider family this image belongs to
    pub provider: ProviderKind,

    /// Operating system this image carries
    pub os: OsDescriptor,

    /// Opaque provider-specific locator
    pub reference: String,

    /// Names of the releases this image is valid for; never empty
    pub releases: BTreeSet<String>,
}

impl Image {
    /// Create an image valid for at least one release
    ///
    /// The constructor takes a first release name separately so that an
    /// image can never be registered with an empty release set.
    pub fn new(
        name: impl Into<String>,
        provider: ProviderKind,
        os: OsDescriptor,
        reference: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        let mut releases = BTreeSet::new();
        releases.insert(release.into());
        Self {
            name: name.into(),
            provider,
            os,
            reference: reference.into(),
            releases,
        }
    }

    /// Mark the image valid for an additional release
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.releases.insert(release.into());
        self
    }

    /// True when the image is valid for the named release
    pub fn supports_release(&self, release: &str) -> bool {
        self.releases.contains(release)
    }
}
