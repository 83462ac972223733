//! Viewport adapter interface.
//!
//! The pyramid never does projection math itself; it asks the enclosing plot
//! whether a coord is still worth keeping and where the view origin sits.

use crate::coord::TileCoord;

/// Query interface onto the enclosing plot's viewport.
///
/// The pyramid calls [`is_in_view`](ViewportQuery::is_in_view) with a
/// normalized coord on every fresh load to classify it as add or discard.
/// The enclosing layer uses
/// [`target_visible_coords`](ViewportQuery::target_visible_coords) to build
/// the input for `request_tiles` when the view changes.
pub trait ViewportQuery: Send + Sync {
    /// Whether the coord intersects the target view. `wraparound` asks the
    /// adapter to consider horizontal world copies.
    fn is_in_view(&self, coord: TileCoord, wraparound: bool) -> bool;

    /// The coords the target view needs at its current zoom.
    fn target_visible_coords(&self) -> Vec<TileCoord>;

    /// Current view origin in plot pixels, used to place renderables.
    fn view_offset(&self) -> (f64, f64) {
        (0.0, 0.0)
    }
}

/// Viewport that keeps everything: nothing is ever discarded as out of view.
///
/// Useful for tests and for consumers that manage visibility themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnboundedViewport;

impl ViewportQuery for UnboundedViewport {
    fn is_in_view(&self, _coord: TileCoord, _wraparound: bool) -> bool {
        true
    }

    fn target_visible_coords(&self) -> Vec<TileCoord> {
        Vec::new()
    }
}
