//! Per-match exclusive locks.
//!
//! Each match id maps to its own mutex, so mutations of one match serialize
//! while mutations of different matches never contend. Entries are dropped
//! once no caller holds or awaits them.

use crate::MatchId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, instrument, trace};

/// Registry of per-match mutexes.
#[derive(Debug, Clone, Default)]
pub struct MatchLocks {
    slots: Arc<Mutex<HashMap<MatchId, Arc<Mutex<()>>>>>,
}

impl MatchLocks {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating match lock registry");
        Self::default()
    }

    /// Runs `f` while holding the exclusive lock for `match_id`.
    ///
    /// Blocks until the lock is free. The lock is released when `f`
    /// returns or unwinds.
    #[instrument(skip(self, f))]
    pub fn with_exclusive<T>(&self, match_id: MatchId, f: impl FnOnce() -> T) -> T {
        let lease = SlotLease {
            locks: self,
            match_id,
            slot: self.acquire_slot(match_id),
        };
        // The guarded value is `()`, so a poisoned lock carries no torn state.
        let _guard = lease.slot.lock().unwrap_or_else(PoisonError::into_inner);
        trace!(match_id, "Match lock held");
        f()
    }

    /// Number of matches with a live lock entry.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn acquire_slot(&self, match_id: MatchId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(match_id).or_default())
    }

    fn release_slot(&self, match_id: MatchId, slot: &Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map plus ours: nobody else is waiting.
        if Arc::strong_count(slot) == 2 {
            slots.remove(&match_id);
            trace!(match_id, "Match lock entry released");
        }
    }
}

/// Releases a registry entry when dropped, including during unwinding.
struct SlotLease<'a> {
    locks: &'a MatchLocks,
    match_id: MatchId,
    slot: Arc<Mutex<()>>,
}

impl Drop for SlotLease<'_> {
    fn drop(&mut self) {
        self.locks.release_slot(self.match_id, &self.slot);
    }
}
