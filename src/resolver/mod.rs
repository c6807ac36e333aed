//! The core matching algorithm: queries against the candidate catalog
//!
//! `Resolver::resolve` selects the release a query asks for, then filters
//! the catalog's images for the query's provider down to those valid for
//! that release and matching each pool's OS constraint. The per-pool maps
//! are additionally populated for every other compatible release in the
//! catalog, so a caller can cross-check an already-applied release/image
//! pairing against the currently valid set instead of only taking the
//! single best match.
//!
//! Resolution never mutates the catalog and is referentially transparent
//! for a fixed catalog generation; results are cached per generation.

mod cache;

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, Image, ProviderKind, Release};
use crate::query::{OsConstraint, Query, VersionSelector};
use crate::version::ReleaseVersion;
use crate::{Error, Result};

use cache::ResolutionCache;

/// Resolution output for a single machine pool
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolResolution {
    /// Name of the release selected for this pool
    pub release: String,

    /// Release name → (image name → image), restricted to images matching
    /// the pool's OS constraint
    ///
    /// Keys cover the selected release plus every compatible release in
    /// the catalog. An empty inner map means "no compatible image
    /// currently known" and is valid content, not an error.
    pub images_by_release: BTreeMap<String, BTreeMap<String, Image>>,
}

impl PoolResolution {
    /// Images for the selected release, the common case
    pub fn images(&self) -> Option<&BTreeMap<String, Image>> {
        self.images_by_release.get(&self.release)
    }
}

/// The output of a resolution: one entry per machine pool
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Resolution for the control-plane pool
    pub control_plane: PoolResolution,

    /// Resolutions for worker pools, keyed by pool name
    pub workers: BTreeMap<String, PoolResolution>,
}

/// Matches queries against the catalog, with a generation-keyed cache
#[derive(Debug)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    cache: ResolutionCache,
}

impl Resolver {
    /// Create a resolver over the given catalog
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            cache: ResolutionCache::default(),
        }
    }

    /// The catalog this resolver reads from
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Resolve a query against the current catalog content
    ///
    /// Fails with [`Error::NoMatchingRelease`] only when the desired
    /// version names a release that does not exist (or the `"default"`
    /// selector is used with no default designated). Pools for which no
    /// image matches get empty image maps; the caller decides whether
    /// that is fatal.
    pub fn resolve(&self, query: &Query) -> Result<Resolution> {
        let generation = self.catalog.generation();
        let key = query_hash(query);

        if let Some(hit) = self.cache.lookup(generation, key) {
            debug!(generation, key, "resolve: cache hit");
            return Ok(hit);
        }

        let resolution = self.resolve_uncached(query)?;
        self.cache.store(generation, key, resolution.clone());
        debug!(
            generation,
            key,
            release = %resolution.control_plane.release,
            "resolve: computed and cached"
        );
        Ok(resolution)
    }

    fn resolve_uncached(&self, query: &Query) -> Result<Resolution> {
        let releases = self.catalog.releases();
        let selected = match &query.desired_version {
            VersionSelector::Default => {
                let name = self.catalog.default_release().ok_or_else(|| {
                    Error::no_matching_release("no default release designated")
                })?;
                releases.iter().find(|r| r.name == name).ok_or_else(|| {
                    Error::no_matching_release(format!(
                        "default release '{name}' does not exist in the catalog"
                    ))
                })?
            }
            VersionSelector::Exact(version) => {
                select_exact(query.provider, version, &releases)?
            }
        };

        // The selected release resolves even when incompatible; its
        // condition stays on the catalog record for callers to inspect.
        let mut release_names: BTreeSet<String> = releases
            .iter()
            .filter(|r| r.is_compatible())
            .map(|r| r.name.clone())
            .collect();
        release_names.insert(selected.name.clone());

        let images = self.catalog.images(query.provider);

        let pool = |constraint: &OsConstraint| -> PoolResolution {
            let images_by_release = release_names
                .iter()
                .map(|release| {
                    let matching: BTreeMap<String, Image> = images
                        .iter()
                        .filter(|image| {
                            image.supports_release(release) && constraint.matches(&image.os)
                        })
                        .map(|image| (image.name.clone(), image.clone()))
                        .collect();
                    (release.clone(), matching)
                })
                .collect();
            PoolResolution {
                release: selected.name.clone(),
                images_by_release,
            }
        };

        let control_plane = pool(&query.control_plane);
        let workers = query
            .workers
            .iter()
            .map(|(name, constraint)| (name.clone(), pool(constraint)))
            .collect();

        Ok(Resolution {
            control_plane,
            workers,
        })
    }
}

/// The conventional release name for a provider and version
///
/// Used only to break ties between aliased releases sharing a version;
/// the preference is documented, deterministic, and covered by a
/// dedicated test rather than relying on incidental ordering.
fn conventional_release_name(provider: ProviderKind, version: &ReleaseVersion) -> String {
    format!(
        "{provider}-v{}.{}.{}",
        version.major(),
        version.minor(),
        version.patch()
    )
}

fn select_exact<'a>(
    provider: ProviderKind,
    version: &ReleaseVersion,
    releases: &'a [Release],
) -> Result<&'a Release> {
    let candidates: Vec<&Release> = releases.iter().filter(|r| &r.version == version).collect();
    if candidates.is_empty() {
        return Err(Error::no_matching_release(format!(
            "no release with version {version} in catalog"
        )));
    }
    // Aliased releases: prefer the conventional provider name, else the
    // lexicographically smallest (the snapshot is sorted by name).
    let conventional = conventional_release_name(provider, version);
    Ok(candidates
        .iter()
        .find(|r| r.name == conventional)
        .copied()
        .unwrap_or(candidates[0]))
}

fn query_hash(query: &Query) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    hasher.finish()
}
