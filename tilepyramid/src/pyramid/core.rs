//! The tile pyramid: request scheduling, caching, and cancellation.
//!
//! A [`TilePyramid`] owns the tile store and the request registries and is
//! driven from a single execution context. Loads may resolve synchronously
//! inside [`request_tiles`](TilePyramid::request_tiles) or arbitrarily later
//! through [`complete`](TilePyramid::complete); between dispatch and
//! completion the viewport keeps moving, `clear` may cancel everything, and
//! the same coord may be re-requested — the pending and stale registries
//! classify every response as fresh, stale, or unsolicited with no leaks.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::{StoreStats, TileStore};
use crate::coord::TileCoord;
use crate::loader::{Fetch, LoadError, TileLoader};
use crate::tile::Tile;
use crate::viewport::ViewportQuery;

use super::config::PyramidConfig;
use super::events::{EventSink, TileEvent};
use super::pending::{PendingRegistry, StaleRegistry};

/// Caching and scheduling core of a tiled-data layer.
pub struct TilePyramid {
    config: PyramidConfig,
    store: TileStore,
    pending: PendingRegistry,
    stale: StaleRegistry,
    loader: Box<dyn TileLoader>,
    viewport: Arc<dyn ViewportQuery>,
    events: Arc<dyn EventSink>,
}

impl TilePyramid {
    /// Create a pyramid wired to its collaborators.
    pub fn new(
        config: PyramidConfig,
        loader: Box<dyn TileLoader>,
        viewport: Arc<dyn ViewportQuery>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let store = TileStore::new(config.cache_size, config.persistent_levels);
        Self {
            config,
            store,
            pending: PendingRegistry::new(),
            stale: StaleRegistry::new(),
            loader,
            viewport,
            events,
        }
    }

    /// The configuration this pyramid was built with.
    pub fn config(&self) -> &PyramidConfig {
        &self.config
    }

    /// Request a batch of coords, dispatching the ones that are missing.
    ///
    /// Coords outside the zoom band or off the map are dropped. The batch is
    /// deduplicated after wrap normalization, and coords that are already
    /// stored or already in flight are skipped, so each needed coord costs
    /// exactly one loader call. Synchronous loader results are processed
    /// before the call returns.
    pub fn request_tiles(&mut self, coords: &[TileCoord]) {
        let mut seen = HashSet::new();
        let mut dispatch = Vec::new();

        for coord in coords {
            if coord.z < self.config.min_zoom || coord.z > self.config.max_zoom {
                trace!(coord = %coord, "dropped request outside zoom band");
                continue;
            }
            if !coord.is_valid() {
                trace!(coord = %coord, "dropped invalid request");
                continue;
            }
            let target = coord.normalize();
            let key = target.key();
            if !seen.insert(key) {
                continue;
            }
            if self.store.contains(target) || self.pending.contains(key) {
                continue;
            }
            dispatch.push((key, target));
        }

        debug!(
            requested = coords.len(),
            dispatched = dispatch.len(),
            "tile batch requested"
        );

        // The whole batch registers as pending before anything is handed to
        // the loader: a synchronous completion must not observe a registry
        // missing the batch's later coords and announce a drain mid-batch.
        for (key, target) in &dispatch {
            self.pending.insert(*key, *target);
        }
        for (_, target) in dispatch {
            self.events.emit(TileEvent::Request { coord: target });
            match self.loader.fetch(target) {
                Fetch::Ready(result) => self.complete(target, result),
                Fetch::Deferred => {}
            }
        }
    }

    /// Deliver a loader result for a previously fetched coord.
    ///
    /// Responses whose request was cancelled by [`clear`](TilePyramid::clear)
    /// pay down the coord's stale debt and are discarded; the debt is checked
    /// first so that after N clear-and-reissue cycles exactly N responses are
    /// absorbed regardless of arrival order. A response with no pending
    /// record and no debt is unsolicited and dropped silently.
    pub fn complete(&mut self, coord: TileCoord, result: Result<Vec<u8>, LoadError>) {
        let target = coord.normalize();
        if !target.is_valid() {
            trace!(coord = %target, "response for invalid coord dropped");
            return;
        }
        let key = target.key();

        if self.stale.absorb(key) {
            debug!(coord = %target, remaining_debt = self.stale.debt(key), "stale response discarded");
            self.events.emit(TileEvent::Discard { coord: target });
            return;
        }

        let Some(request) = self.pending.remove(key) else {
            trace!(coord = %target, "unsolicited response dropped");
            return;
        };
        self.pending.record_completion();

        match result {
            Ok(data) => {
                let tile = Tile::new(request.target, data);
                if self.viewport.is_in_view(request.target, true) {
                    if let Some(evicted) = self.store.insert(tile.clone()) {
                        self.events.emit(TileEvent::Remove { tile: evicted });
                    }
                    self.events.emit(TileEvent::Add { tile });
                } else {
                    debug!(coord = %target, "fresh tile out of view, discarded");
                    self.events.emit(TileEvent::Discard {
                        coord: request.target,
                    });
                }
            }
            Err(error) => {
                debug!(coord = %target, %error, "tile load failed");
                self.events.emit(TileEvent::Failure {
                    coord: request.target,
                    error,
                });
            }
        }

        if self.pending.group_drained() {
            self.events.emit(TileEvent::Load);
        }
    }

    /// Cancel every outstanding request and drop every stored tile.
    ///
    /// Pending records move to the stale registry, so their late responses
    /// will be discarded; the loader gets a best-effort cancel per coord. A
    /// `remove` event fires for each stored tile before this returns, and
    /// `has`/`is_pending` are false for every coord immediately — including
    /// coords whose loader callback has not fired yet.
    pub fn clear(&mut self) {
        let cancelled = self.pending.drain();
        for (key, request) in &cancelled {
            self.stale.bump(*key);
            self.loader.cancel(request.target);
        }
        self.pending.reset_group();

        let removed = self.store.drain();
        debug!(
            cancelled = cancelled.len(),
            removed = removed.len(),
            "pyramid cleared"
        );
        for tile in removed {
            self.events.emit(TileEvent::Remove { tile });
        }
    }

    /// Look up the tile stored for a coord, refreshing its recency.
    pub fn get(&mut self, coord: TileCoord) -> Option<Tile> {
        self.store.get(coord)
    }

    /// True when the coord (after normalization) is stored.
    pub fn has(&self, coord: TileCoord) -> bool {
        self.store.contains(coord)
    }

    /// True when the coord has an outstanding fresh request.
    pub fn is_pending(&self, coord: TileCoord) -> bool {
        let target = coord.normalize();
        target.is_valid() && self.pending.contains(target.key())
    }

    /// Total number of tiles the store can hold.
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Number of stored tiles.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no tiles are stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of outstanding fresh requests.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Store occupancy counters.
    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub(crate) fn store(&self) -> &TileStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut TileStore {
        &mut self.store
    }

    pub(crate) fn viewport(&self) -> &Arc<dyn ViewportQuery> {
        &self.viewport
    }
}
