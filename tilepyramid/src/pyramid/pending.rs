//! In-flight request bookkeeping.
//!
//! Two small registries keep the request lifecycle honest while the viewport
//! keeps moving under asynchronous loads. The pending registry remembers
//! which coords have an outstanding fetch whose result is still wanted. The
//! stale registry counts, per coord, how many responses were cancelled by
//! `clear` and must be absorbed when they eventually arrive — a counter
//! rather than per-call tokens, because N clear-and-reissue cycles must
//! discard exactly N late responses in whatever order they land.

use std::collections::HashMap;

use crate::coord::TileCoord;

/// Record of one outstanding fetch.
#[derive(Debug, Clone)]
pub(crate) struct PendingRequest {
    /// Normalized coord the fetch was dispatched for.
    pub target: TileCoord,
}

/// Coords with an outstanding fetch, plus the completion accounting that
/// drives the `load` event.
#[derive(Debug, Default)]
pub(crate) struct PendingRegistry {
    entries: HashMap<u64, PendingRequest>,
    /// Fresh completions observed since the registry last drained.
    group_completions: u32,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a dispatched fetch. Returns false if the key was already
    /// pending (the caller should not have dispatched it).
    pub fn insert(&mut self, key: u64, target: TileCoord) -> bool {
        self.entries.insert(key, PendingRequest { target }).is_none()
    }

    /// Take the record for a completed fetch.
    pub fn remove(&mut self, key: u64) -> Option<PendingRequest> {
        self.entries.remove(&key)
    }

    pub fn contains(&self, key: u64) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the registry, handing back every record (used by `clear` to
    /// transfer them into the stale registry).
    pub fn drain(&mut self) -> Vec<(u64, PendingRequest)> {
        self.entries.drain().collect()
    }

    /// Count a fresh completion toward the current group.
    pub fn record_completion(&mut self) {
        self.group_completions += 1;
    }

    /// Forget the current group's completions (after `clear`, a drain made
    /// only of stale responses must not announce a finished load).
    pub fn reset_group(&mut self) {
        self.group_completions = 0;
    }

    /// True exactly once per drain: the registry just became empty and the
    /// group saw at least one fresh completion. Resets the group counter.
    pub fn group_drained(&mut self) -> bool {
        if self.entries.is_empty() && self.group_completions > 0 {
            self.group_completions = 0;
            true
        } else {
            false
        }
    }
}

/// Per-coord counters of cancelled responses still expected to arrive.
#[derive(Debug, Default)]
pub(crate) struct StaleRegistry {
    counts: HashMap<u64, u32>,
}

impl StaleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more cancelled response for this coord.
    pub fn bump(&mut self, key: u64) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Absorb one late response. Returns true when the coord had stale debt
    /// (the response must be discarded); the entry disappears at zero.
    pub fn absorb(&mut self, key: u64) -> bool {
        match self.counts.get_mut(&key) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&key);
                }
                true
            }
            None => false,
        }
    }

    /// Outstanding cancelled responses for this coord.
    pub fn debt(&self, key: u64) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: i32) -> u64 {
        TileCoord::new(5, x, 0).key()
    }

    #[test]
    fn pending_insert_remove_round_trip() {
        let mut pending = PendingRegistry::new();
        let coord = TileCoord::new(5, 3, 0);

        assert!(pending.insert(key(3), coord));
        assert!(pending.contains(key(3)));
        assert_eq!(pending.len(), 1);

        let record = pending.remove(key(3)).unwrap();
        assert_eq!(record.target, coord);
        assert!(pending.is_empty());
        assert!(pending.remove(key(3)).is_none());
    }

    #[test]
    fn duplicate_insert_is_reported() {
        let mut pending = PendingRegistry::new();
        assert!(pending.insert(key(1), TileCoord::new(5, 1, 0)));
        assert!(!pending.insert(key(1), TileCoord::new(5, 1, 0)));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn group_drains_only_with_fresh_completions() {
        let mut pending = PendingRegistry::new();
        pending.insert(key(1), TileCoord::new(5, 1, 0));
        pending.insert(key(2), TileCoord::new(5, 2, 0));

        pending.remove(key(1));
        pending.record_completion();
        // Still one outstanding: no drain yet.
        assert!(!pending.group_drained());

        pending.remove(key(2));
        pending.record_completion();
        assert!(pending.group_drained());
        // The drain is announced once.
        assert!(!pending.group_drained());
    }

    #[test]
    fn reset_group_silences_the_drain() {
        let mut pending = PendingRegistry::new();
        pending.insert(key(1), TileCoord::new(5, 1, 0));
        pending.remove(key(1));
        pending.record_completion();
        pending.reset_group();

        assert!(!pending.group_drained());
    }

    #[test]
    fn empty_group_never_drains() {
        let mut pending = PendingRegistry::new();
        assert!(!pending.group_drained());
    }

    #[test]
    fn stale_counter_absorbs_exactly_its_debt() {
        let mut stale = StaleRegistry::new();
        stale.bump(key(1));
        stale.bump(key(1));
        assert_eq!(stale.debt(key(1)), 2);

        assert!(stale.absorb(key(1)));
        assert!(stale.absorb(key(1)));
        // Debt exhausted: the next response for this coord is not stale.
        assert!(!stale.absorb(key(1)));
        assert!(stale.is_empty());
    }

    #[test]
    fn stale_counters_are_per_coord() {
        let mut stale = StaleRegistry::new();
        stale.bump(key(1));
        stale.bump(key(2));

        assert!(stale.absorb(key(2)));
        assert_eq!(stale.debt(key(1)), 1);
        assert_eq!(stale.debt(key(2)), 0);
    }
}
