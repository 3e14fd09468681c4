//! Memoized query outcomes keyed by bucket selection.
//!
//! A key holds one bucket index per beacon in the engine's beacon order. Both
//! estimates and "no solution" outcomes are stored, so a selection proven
//! unsatisfiable is never searched again.
//!
//! Each key owns a `OnceCell`. The first caller for an unseen key runs the
//! search; concurrent callers for the same key block on the cell until the
//! result is published instead of repeating the search. Callers for different
//! keys only contend on the map lock while looking up or creating a slot.

use crate::Centroid;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bucket index per beacon, in configured beacon order.
pub type BucketKey = SmallVec<[usize; 8]>;

type Slot = Arc<OnceCell<Option<Centroid>>>;

/// Result of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheLookup {
    /// A stored outcome; `Hit(None)` means the selection has no solution.
    Hit(Option<Centroid>),
    Miss,
}

/// Cache usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    slots: RwLock<FxHashMap<BucketKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the stored outcome for `key`.
    ///
    /// A key whose computation is still in flight is reported as a miss.
    pub fn fetch(&self, key: &[usize]) -> CacheLookup {
        let found = self
            .slots
            .read()
            .get(key)
            .and_then(|slot| slot.get().copied());

        match found {
            Some(outcome) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Hit(outcome)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Miss
            }
        }
    }

    /// Store `outcome` for `key`, replacing any previous value.
    pub fn insert(&self, key: &[usize], outcome: Option<Centroid>) {
        let slot = Arc::new(OnceCell::with_value(outcome));
        self.slots.write().insert(BucketKey::from_slice(key), slot);
    }

    /// Return the stored outcome for `key`, running `compute` if there is none.
    ///
    /// Only one caller runs `compute` for a given key; others wait for it.
    /// The flag is `true` when this call ran `compute`.
    pub fn get_or_compute<F>(&self, key: &[usize], compute: F) -> (Option<Centroid>, bool)
    where
        F: FnOnce() -> Option<Centroid>,
    {
        let slot = self.slot(key);

        if let Some(outcome) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return (*outcome, false);
        }

        let mut computed = false;
        let outcome = *slot.get_or_init(|| {
            computed = true;
            compute()
        });

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        (outcome, computed)
    }

    fn slot(&self, key: &[usize]) -> Slot {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write();
        Arc::clone(slots.entry(BucketKey::from_slice(key)).or_default())
    }

    /// Number of keys with a stored outcome.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
