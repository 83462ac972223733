//! Pyramid lifecycle events.
//!
//! The pyramid emits structured events through a sink abstraction and does
//! not know how they are consumed — emit, don't present. Sinks observe every
//! event synchronously, after the state change it reports has been applied.

use crate::coord::TileCoord;
use crate::loader::LoadError;
use crate::tile::Tile;

/// Events emitted by the pyramid as requests move through their lifecycle.
#[derive(Debug, Clone)]
pub enum TileEvent {
    /// A coord was dispatched to the loader.
    Request { coord: TileCoord },
    /// A fresh load succeeded and the tile entered the store.
    Add { tile: Tile },
    /// A fresh load failed.
    Failure { coord: TileCoord, error: LoadError },
    /// A response was thrown away: stale after `clear`, or a fresh success
    /// that scrolled out of view before it arrived.
    Discard { coord: TileCoord },
    /// A tile left the store, by eviction or by `clear`.
    Remove { tile: Tile },
    /// The pending registry drained with at least one fresh completion.
    Load,
}

impl TileEvent {
    /// Wire name of this event, for string-keyed emitters.
    pub fn name(&self) -> &'static str {
        match self {
            TileEvent::Request { .. } => "tile:request",
            TileEvent::Add { .. } => "tile:add",
            TileEvent::Failure { .. } => "tile:failure",
            TileEvent::Discard { .. } => "tile:discard",
            TileEvent::Remove { .. } => "tile:remove",
            TileEvent::Load => "load",
        }
    }

    /// The coord this event concerns, if it has one.
    pub fn coord(&self) -> Option<TileCoord> {
        match self {
            TileEvent::Request { coord }
            | TileEvent::Failure { coord, .. }
            | TileEvent::Discard { coord } => Some(*coord),
            TileEvent::Add { tile } | TileEvent::Remove { tile } => Some(tile.coord()),
            TileEvent::Load => None,
        }
    }
}

/// Consumer of pyramid events.
///
/// Payloads handed out here are shared read-only with the store; sinks must
/// not assume exclusive ownership.
pub trait EventSink: Send + Sync {
    /// Observe one event.
    fn emit(&self, event: TileEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: TileEvent) {}
}
