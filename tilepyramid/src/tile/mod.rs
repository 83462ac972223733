//! Tile value types.
//!
//! A [`Tile`] is the immutable pairing of a coordinate with the opaque
//! payload the loader produced for it. A [`TilePartial`] records how a stored
//! tile stands in for a possibly different target coordinate, carrying enough
//! geometry to place and crop it without re-walking the hierarchy.

use crate::coord::TileCoord;
use std::sync::Arc;

/// An immutable tile: one coordinate plus the payload loaded for it.
///
/// The payload bytes are opaque to the pyramid; sharing is by `Arc`, so
/// clones are cheap and observers receive the same allocation the store
/// holds. A tile is never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    coord: TileCoord,
    data: Arc<Vec<u8>>,
}

impl Tile {
    /// Create a tile from a loader payload.
    pub fn new(coord: TileCoord, data: Vec<u8>) -> Self {
        Self {
            coord,
            data: Arc::new(data),
        }
    }

    /// The coordinate this tile was loaded for.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// The opaque payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Normalized texture sub-rectangle, in `[0, 1]` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u: f64,
    pub v: f64,
    pub w: f64,
    pub h: f64,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect {
        u: 0.0,
        v: 0.0,
        w: 1.0,
        h: 1.0,
    };
}

/// A stored tile standing in for a target coordinate.
///
/// `target` is the coord the caller asked for. `relative` positions the drawn
/// content: the target itself when the tile is the target or one of its
/// ancestors, the tile's own coord when the tile is a descendant filling a
/// sub-slot of the target. The triple determines the UV crop, the plot
/// offset, and the render scale.
#[derive(Debug, Clone)]
pub struct TilePartial {
    pub tile: Tile,
    pub target: TileCoord,
    pub relative: TileCoord,
}

impl TilePartial {
    /// The tile is the target itself.
    pub fn exact(tile: Tile) -> Self {
        let target = tile.coord();
        Self {
            tile,
            target,
            relative: target,
        }
    }

    /// An ancestor tile substitutes for `target`; the sub-square of the
    /// ancestor corresponding to `target` is drawn into the target's slot.
    pub fn ancestor(tile: Tile, target: TileCoord) -> Self {
        debug_assert!(tile.coord().is_ancestor_of(&target));
        Self {
            tile,
            target,
            relative: target,
        }
    }

    /// A descendant tile fills its own sub-slot of `target`.
    pub fn descendant(tile: Tile, target: TileCoord) -> Self {
        debug_assert!(tile.coord().is_descendant_of(&target));
        let relative = tile.coord();
        Self {
            tile,
            target,
            relative,
        }
    }

    /// Sub-rectangle of the tile's texture to draw.
    ///
    /// Full for exact and descendant substitutes; for an ancestor at distance
    /// `d` above `relative`, the `1/2^d`-sized sub-square that `relative`
    /// occupies inside it.
    pub fn uv_rect(&self) -> UvRect {
        let tile_coord = self.tile.coord();
        debug_assert!(self.relative.z >= tile_coord.z);
        let span = 1.0 / (1u64 << (self.relative.z - tile_coord.z)) as f64;
        UvRect {
            u: self.relative.x as f64 * span - tile_coord.x as f64,
            v: self.relative.y as f64 * span - tile_coord.y as f64,
            w: span,
            h: span,
        }
    }

    /// Magnification of the tile's texels relative to the target zoom:
    /// 1 for an exact match, `2^d` for an ancestor `d` levels up, `1/2^d`
    /// for a descendant `d` levels down.
    pub fn render_scale(&self) -> f64 {
        2f64.powi(self.target.z as i32 - self.tile.coord().z as i32)
    }

    /// Top-left corner of the drawn quad in plot pixels, given the tile edge
    /// size and the current view origin `(vx, vy)`.
    pub fn plot_offset(&self, tile_size: f64, view_offset: (f64, f64)) -> (f64, f64) {
        let slot = 2f64.powi(self.target.z as i32 - self.relative.z as i32);
        (
            self.relative.x as f64 * slot * tile_size - view_offset.0,
            self.relative.y as f64 * slot * tile_size - view_offset.1,
        )
    }
}
