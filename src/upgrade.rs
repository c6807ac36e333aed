//! Compatibility gating and upgrade-path computation
//!
//! A release is compatible unless it is explicitly labeled incompatible;
//! everything here derives from catalog content, never from time or
//! external signals. The upgrade ladder disallows multi-minor skips: the
//! only release a given version may legally jump from to reach the
//! catalog default is the one exactly one minor version behind it.
//!
//! Per-release state machine: `Unknown` → `Compatible | Incompatible` on
//! catalog ingestion (via [`apply_compatibility`]); a compatible release
//! additionally carries an updates-available signal maintained by
//! [`refresh_updates_available`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::catalog::{
    Catalog, CompatibilityCondition, Condition, ConditionSeverity, ConditionStatus, Release,
    UpdatesAvailableCondition,
};
use crate::version::ReleaseVersion;
use crate::{AVAILABLE_UPGRADES_ANNOTATION, UPDATES_AVAILABLE_CONDITION};

/// Names of all releases not explicitly marked incompatible
pub fn compatible_releases(catalog: &Catalog) -> BTreeSet<String> {
    catalog
        .releases()
        .into_iter()
        .filter(|r| r.is_compatible())
        .map(|r| r.name)
        .collect()
}

/// Recompute every release's compatibility condition from its labels
///
/// The severity stamped onto incompatible releases is an explicit policy
/// decision of the caller (Warning for advisory handling, Error when an
/// incompatible release must block). Releases whose condition already
/// matches are left untouched so the catalog generation only advances
/// when something actually changed.
pub fn apply_compatibility(catalog: &Catalog, incompatible_severity: ConditionSeverity) {
    for release in catalog.releases() {
        let desired = if release.is_incompatible_labeled() {
            CompatibilityCondition::incompatible("IncompatibleLabelSet", incompatible_severity)
        } else {
            CompatibilityCondition::compatible("NoIncompatibleLabel")
        };
        if release.compatibility != desired {
            debug!(name = %release.name, state = %desired.state, "compatibility condition updated");
            catalog.update_release(&release.name, |r| r.compatibility = desired);
        }
    }
}

/// The legal upgrade step computed from the catalog's release ladder
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeTarget {
    /// The catalog's currently designated default release
    pub default: Release,

    /// The newest compatible release exactly one minor version below the
    /// default — the only release from which the jump to the default is
    /// legal. None when no such release exists.
    pub old: Option<Release>,
}

/// Compute the next legal upgrade step for a version currently in use
///
/// Among compatible releases sorted ascending by version, the target is
/// always the catalog default; `old` identifies the release one minor
/// version behind it (patch and pre-release differences are ignored).
/// Returns None when the catalog designates no default, the default is
/// missing, or `current` is already at or past the default version.
pub fn next_upgrade_target(current: &ReleaseVersion, catalog: &Catalog) -> Option<UpgradeTarget> {
    let releases = catalog.releases();
    let default_name = catalog.default_release()?;
    let default = releases.iter().find(|r| r.name == default_name)?.clone();

    if current >= &default.version {
        return None;
    }

    let mut compatible: Vec<&Release> = releases.iter().filter(|r| r.is_compatible()).collect();
    compatible.sort_by(|a, b| a.version.cmp(&b.version));

    let old = compatible
        .iter()
        .filter(|r| {
            r.version < default.version && default.version.is_one_minor_above(&r.version)
        })
        .next_back()
        .map(|r| (*r).clone());

    Some(UpgradeTarget { default, old })
}

/// Cluster-side state handed in by a status collaborator
///
/// Carries only what [`available_upgrades`] projects from: the cluster's
/// persisted conditions and annotations.
#[derive(Clone, Debug, Default)]
pub struct ClusterState {
    /// Persisted status conditions
    pub conditions: Vec<Condition>,

    /// Persisted annotations
    pub annotations: BTreeMap<String, String>,
}

/// Read the advertised upgrade targets off a cluster's persisted state
///
/// A pure projection, not a fresh computation: collects versions from the
/// updates-available condition message and the available-upgrades
/// annotation (both comma-separated). An absent condition or annotation
/// yields an empty set, never an error.
pub fn available_upgrades(cluster: &ClusterState) -> BTreeSet<String> {
    let mut versions = BTreeSet::new();

    let advertised = cluster
        .conditions
        .iter()
        .find(|c| c.type_ == UPDATES_AVAILABLE_CONDITION && c.status == ConditionStatus::True)
        .map(|c| c.message.as_str());
    if let Some(message) = advertised {
        versions.extend(split_versions(message));
    }

    if let Some(annotation) = cluster.annotations.get(AVAILABLE_UPGRADES_ANNOTATION) {
        versions.extend(split_versions(annotation));
    }

    versions
}

fn split_versions(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Recompute every release's updates-available condition
///
/// A release has updates available when a strictly newer compatible
/// release exists in the catalog; the condition lists those versions in
/// ascending order. Unchanged conditions are left untouched.
pub fn refresh_updates_available(catalog: &Catalog) {
    let releases = catalog.releases();
    let mut compatible: Vec<&Release> = releases.iter().filter(|r| r.is_compatible()).collect();
    compatible.sort_by(|a, b| a.version.cmp(&b.version));

    for release in &releases {
        let newer: Vec<String> = compatible
            .iter()
            .filter(|r| r.version > release.version)
            .map(|r| r.version.as_str().to_string())
            .collect();
        let desired = UpdatesAvailableCondition {
            available: !newer.is_empty(),
            versions: newer,
        };
        if release.updates != desired {
            debug!(
                name = %release.name,
                available = desired.available,
                "updates-available condition updated"
            );
            catalog.update_release(&release.name, |r| r.updates = desired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::INCOMPATIBLE_LABEL_KEY;

    fn release(name: &str, version: &str) -> Release {
        Release::new(name, ReleaseVersion::parse(version).unwrap())
    }

    fn version(s: &str) -> ReleaseVersion {
        ReleaseVersion::parse(s).unwrap()
    }

    fn ladder_catalog() -> Catalog {
        let catalog = Catalog::new();
        catalog.add_release(release("v1.23.8", "v1.23.8"));
        catalog.add_release(release("v1.24.2", "v1.24.2"));
        catalog.set_default_release("v1.24.2");
        catalog
    }

    mod compatibility {
        use super::*;

        #[test]
        fn test_unlabeled_releases_are_compatible() {
            let catalog = ladder_catalog();
            let compatible = compatible_releases(&catalog);
            assert!(compatible.contains("v1.23.8"));
            assert!(compatible.contains("v1.24.2"));
        }

        #[test]
        fn test_labeled_release_is_excluded() {
            let catalog = ladder_catalog();
            catalog
                .add_release(release("v1.25.0", "v1.25.0").with_label(INCOMPATIBLE_LABEL_KEY, ""));
            let compatible = compatible_releases(&catalog);
            assert!(!compatible.contains("v1.25.0"));
            assert_eq!(compatible.len(), 2);
        }

        #[test]
        fn test_apply_compatibility_sets_conditions() {
            let catalog = ladder_catalog();
            catalog
                .add_release(release("v1.25.0", "v1.25.0").with_label(INCOMPATIBLE_LABEL_KEY, ""));

            apply_compatibility(&catalog, ConditionSeverity::Error);

            let good = catalog.release("v1.24.2").unwrap();
            assert_eq!(
                good.compatibility.state,
                crate::catalog::Compatibility::Compatible
            );
            let bad = catalog.release("v1.25.0").unwrap();
            assert_eq!(
                bad.compatibility.state,
                crate::catalog::Compatibility::Incompatible
            );
            // Severity came from the caller's policy, not a baked-in guess
            assert_eq!(bad.compatibility.severity, ConditionSeverity::Error);
        }

        #[test]
        fn test_apply_compatibility_is_idempotent_on_generation() {
            let catalog = ladder_catalog();
            apply_compatibility(&catalog, ConditionSeverity::Warning);
            let generation = catalog.generation();
            // Nothing changed, so the generation must not advance
            apply_compatibility(&catalog, ConditionSeverity::Warning);
            assert_eq!(catalog.generation(), generation);
        }
    }

    mod upgrade_ladder {
        use super::*;

        #[test]
        fn test_one_minor_step_to_default() {
            let catalog = ladder_catalog();
            let target = next_upgrade_target(&version("v1.23.8"), &catalog).unwrap();
            assert_eq!(target.default.name, "v1.24.2");
            assert_eq!(target.old.unwrap().name, "v1.23.8");
        }

        #[test]
        fn test_multi_minor_skip_is_never_offered() {
            let catalog = ladder_catalog();
            catalog.add_release(release("v1.20.0", "v1.20.0"));

            let target = next_upgrade_target(&version("v1.20.0"), &catalog).unwrap();
            assert_eq!(target.default.name, "v1.24.2");
            // v1.20.0 is 4 minors behind: it is not the legal predecessor
            let old = target.old.unwrap();
            assert_eq!(old.name, "v1.23.8");
            assert!(target.default.version.is_one_minor_above(&old.version));
        }

        #[test]
        fn test_old_is_newest_patch_on_the_previous_minor() {
            let catalog = ladder_catalog();
            catalog.add_release(release("v1.23.17", "v1.23.17"));
            let target = next_upgrade_target(&version("v1.23.8"), &catalog).unwrap();
            assert_eq!(target.old.unwrap().name, "v1.23.17");
        }

        #[test]
        fn test_incompatible_release_cannot_be_the_step() {
            let catalog = ladder_catalog();
            catalog.update_release("v1.23.8", |r| {
                r.labels.insert(INCOMPATIBLE_LABEL_KEY.to_string(), String::new());
            });
            let target = next_upgrade_target(&version("v1.23.0"), &catalog).unwrap();
            assert!(target.old.is_none());
        }

        #[test]
        fn test_at_or_past_default_has_no_target() {
            let catalog = ladder_catalog();
            assert!(next_upgrade_target(&version("v1.24.2"), &catalog).is_none());
            assert!(next_upgrade_target(&version("v1.25.0"), &catalog).is_none());
        }

        #[test]
        fn test_no_default_designated() {
            let catalog = Catalog::new();
            catalog.add_release(release("v1.24.2", "v1.24.2"));
            assert!(next_upgrade_target(&version("v1.23.8"), &catalog).is_none());
        }
    }

    mod projections {
        use super::*;

        #[test]
        fn test_absent_condition_yields_empty_set() {
            let cluster = ClusterState::default();
            assert!(available_upgrades(&cluster).is_empty());
        }

        #[test]
        fn test_versions_from_condition_message() {
            let cluster = ClusterState {
                conditions: vec![Condition::new(
                    UPDATES_AVAILABLE_CONDITION,
                    ConditionStatus::True,
                    "NewerReleases",
                    "v1.24.2, v1.25.0",
                )],
                annotations: BTreeMap::new(),
            };
            let upgrades = available_upgrades(&cluster);
            assert_eq!(upgrades.len(), 2);
            assert!(upgrades.contains("v1.24.2"));
            assert!(upgrades.contains("v1.25.0"));
        }

        #[test]
        fn test_false_condition_is_ignored() {
            let cluster = ClusterState {
                conditions: vec![Condition::new(
                    UPDATES_AVAILABLE_CONDITION,
                    ConditionStatus::False,
                    "UpToDate",
                    "",
                )],
                annotations: BTreeMap::new(),
            };
            assert!(available_upgrades(&cluster).is_empty());
        }

        #[test]
        fn test_annotation_and_condition_are_unioned() {
            let cluster = ClusterState {
                conditions: vec![Condition::new(
                    UPDATES_AVAILABLE_CONDITION,
                    ConditionStatus::True,
                    "NewerReleases",
                    "v1.24.2",
                )],
                annotations: BTreeMap::from([(
                    AVAILABLE_UPGRADES_ANNOTATION.to_string(),
                    "v1.24.2,v1.25.0".to_string(),
                )]),
            };
            let upgrades = available_upgrades(&cluster);
            assert_eq!(upgrades.len(), 2);
        }
    }

    mod updates_refresh {
        use super::*;

        #[test]
        fn test_newer_compatible_versions_are_advertised() {
            let catalog = ladder_catalog();
            refresh_updates_available(&catalog);

            let old = catalog.release("v1.23.8").unwrap();
            assert!(old.updates.available);
            assert_eq!(old.updates.versions, vec!["v1.24.2"]);

            let newest = catalog.release("v1.24.2").unwrap();
            assert!(!newest.updates.available);
            assert!(newest.updates.versions.is_empty());
        }

        #[test]
        fn test_incompatible_releases_are_not_advertised() {
            let catalog = ladder_catalog();
            catalog
                .add_release(release("v1.25.0", "v1.25.0").with_label(INCOMPATIBLE_LABEL_KEY, ""));
            refresh_updates_available(&catalog);

            let old = catalog.release("v1.23.8").unwrap();
            assert_eq!(old.updates.versions, vec!["v1.24.2"]);
        }

        #[test]
        fn test_refresh_is_idempotent_on_generation() {
            let catalog = ladder_catalog();
            refresh_updates_available(&catalog);
            let generation = catalog.generation();
            refresh_updates_available(&catalog);
            assert_eq!(catalog.generation(), generation);
        }
    }
}
