//! Candidate catalog: the in-memory universe of releases and images
//!
//! The catalog is an explicit, constructed object handed by reference to
//! the resolver and the ingestion collaborator — no process-wide state.
//! Every mutation advances a monotonic generation counter; the resolver's
//! cache keys on that counter, so a bumped generation invalidates all
//! previously cached resolutions at once.
//!
//! Store and counter live behind one reader/writer lock: `add_*` and
//! `remove_*` take the write side, snapshot reads take the read side, and
//! `resolve` may run concurrently with ingestion.

mod image;
mod release;

pub use image::{Image, OsDescriptor, ProviderKind};
pub use release::{
    Compatibility, CompatibilityCondition, Condition, ConditionSeverity, ConditionStatus, Release,
    UpdatesAvailableCondition,
};

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tracing::trace;

/// Interior state guarded by the catalog lock
#[derive(Debug, Default)]
struct CatalogState {
    releases: BTreeMap<String, Release>,
    images: BTreeMap<ProviderKind, BTreeMap<String, Image>>,
    default_release: Option<String>,
    generation: u64,
}

/// The mutable set of candidate releases and images
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Catalog {
    /// Create an empty catalog at generation zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a release by name
    ///
    /// Idempotent upsert; malformed records are rejected by the caller at
    /// construction time, so this never fails. Bumps the generation.
    pub fn add_release(&self, release: Release) {
        let mut state = self.write();
        trace!(name = %release.name, version = %release.version, "catalog: add release");
        state.releases.insert(release.name.clone(), release);
        state.generation += 1;
    }

    /// Insert or replace an image by (provider, name)
    pub fn add_image(&self, image: Image) {
        let mut state = self.write();
        trace!(name = %image.name, provider = %image.provider, "catalog: add image");
        state
            .images
            .entry(image.provider)
            .or_default()
            .insert(image.name.clone(), image);
        state.generation += 1;
    }

    /// Remove a release by name; returns the removed record, if any
    pub fn remove_release(&self, name: &str) -> Option<Release> {
        let mut state = self.write();
        let removed = state.releases.remove(name);
        if removed.is_some() {
            trace!(name, "catalog: remove release");
            if state.default_release.as_deref() == Some(name) {
                state.default_release = None;
            }
            state.generation += 1;
        }
        removed
    }

    /// Remove an image by (provider, name); returns the removed record, if any
    pub fn remove_image(&self, provider: ProviderKind, name: &str) -> Option<Image> {
        let mut state = self.write();
        let removed = state
            .images
            .get_mut(&provider)
            .and_then(|images| images.remove(name));
        if removed.is_some() {
            trace!(name, %provider, "catalog: remove image");
            state.generation += 1;
        }
        removed
    }

    /// Designate the catalog's current default release
    ///
    /// The name does not have to exist yet; resolution against a dangling
    /// default fails with `NoMatchingRelease` at resolve time.
    pub fn set_default_release(&self, name: impl Into<String>) {
        let mut state = self.write();
        state.default_release = Some(name.into());
        state.generation += 1;
    }

    /// Name of the currently designated default release, if any
    pub fn default_release(&self) -> Option<String> {
        self.read().default_release.clone()
    }

    /// Apply a mutation to the named release under the write lock
    ///
    /// Used by the compatibility engine to maintain conditions. Returns
    /// false (without bumping the generation) when the release is absent.
    pub fn update_release(&self, name: &str, f: impl FnOnce(&mut Release)) -> bool {
        let mut state = self.write();
        match state.releases.get_mut(name) {
            Some(release) => {
                f(release);
                state.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Look up a single release by name
    pub fn release(&self, name: &str) -> Option<Release> {
        self.read().releases.get(name).cloned()
    }

    /// Snapshot of all releases, sorted by name
    pub fn releases(&self) -> Vec<Release> {
        self.read().releases.values().cloned().collect()
    }

    /// Snapshot of all images for a provider, sorted by name
    pub fn images(&self, provider: ProviderKind) -> Vec<Image> {
        self.read()
            .images
            .get(&provider)
            .map(|images| images.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Current generation; advances on every mutation
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
