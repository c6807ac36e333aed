//! Generation-keyed cache for resolution results
//!
//! Entries are valid for exactly one catalog generation. When a store
//! arrives for a newer generation the whole previous generation is
//! discarded; a store for an older generation is dropped. This coarse
//! invalidation guarantees a result computed against generation G is
//! never served for a request against G+1.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::Resolution;

#[derive(Debug, Default)]
pub(super) struct ResolutionCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    entries: HashMap<u64, Resolution>,
}

impl ResolutionCache {
    /// Fetch a cached resolution for a query hash at the given generation
    pub(super) fn lookup(&self, generation: u64, key: u64) -> Option<Resolution> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.generation == generation {
            state.entries.get(&key).cloned()
        } else {
            None
        }
    }

    /// Store a resolution computed at the given generation
    pub(super) fn store(&self, generation: u64, key: u64, resolution: Resolution) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if generation > state.generation {
            state.entries.clear();
            state.generation = generation;
        }
        // A store for an older generation raced with a catalog write; the
        // entry would be stale, so it is dropped rather than kept.
        if state.generation == generation {
            state.entries.insert(key, resolution);
        }
    }
}
