//! Level-of-detail substitution.
//!
//! When the renderer asks for a coord that is not loaded yet, the pyramid
//! answers with the best available stand-in: the tile itself, the nearest
//! stored ancestor cropped to the target's footprint, or a set of stored
//! descendants that together cover it. An ancestor wins over descendants
//! when both exist — one tile, one draw.

use crate::coord::{TileCoord, MAX_KEY_ZOOM};
use crate::tile::{Tile, TilePartial, UvRect};

use super::core::TilePyramid;

/// One draw call's worth of substitution: which tile, which part of its
/// texture, and where it goes.
///
/// The quad's top-left corner is `tile_offset` in plot pixels and its edge
/// is `scale * uv.w * tile_size`; for descendants that is a sub-slot of the
/// target, for exact and ancestor matches the target's full slot.
#[derive(Debug, Clone)]
pub struct Renderable {
    /// The stored tile to draw.
    pub tile: Tile,
    /// Texel magnification relative to the target zoom.
    pub scale: f64,
    /// Quad origin in plot pixels.
    pub tile_offset: (f64, f64),
    /// Sub-rectangle of the tile's texture.
    pub uv: UvRect,
}

impl TilePyramid {
    /// The nearest stored ancestor of a coord, walking up toward the root.
    pub fn closest_ancestor(&self, coord: TileCoord) -> Option<TileCoord> {
        let target = coord.normalize();
        for levels in 1..=target.z {
            let ancestor = target.ancestor(levels)?;
            if self.store().contains(ancestor) {
                return Some(ancestor);
            }
        }
        None
    }

    /// The minimal set of stored descendants whose footprints cover the
    /// coord completely, or `None` if no complete covering exists within
    /// the configured search depth.
    ///
    /// Branches resolve at the shallowest stored tile; descendants come out
    /// in row-major order per level, which is the tie-break order for
    /// same-depth coverings.
    pub fn descendants(&mut self, coord: TileCoord) -> Option<Vec<Tile>> {
        let target = coord.normalize();
        let max_depth = self.config().max_descendant_depth;
        if max_depth == 0 || target.z >= MAX_KEY_ZOOM {
            return None;
        }

        let mut tiles = Vec::new();
        for child in target.children() {
            if !self.cover_from(child, max_depth - 1, &mut tiles) {
                return None;
            }
        }
        Some(tiles)
    }

    /// Cover `coord` with stored tiles at or below it, appending to `out`.
    /// Returns false as soon as any branch has a hole.
    fn cover_from(&mut self, coord: TileCoord, depth_left: u8, out: &mut Vec<Tile>) -> bool {
        if let Some(tile) = self.store_mut().get(coord) {
            out.push(tile);
            return true;
        }
        if depth_left == 0 || coord.z >= MAX_KEY_ZOOM {
            return false;
        }
        for child in coord.children() {
            if !self.cover_from(child, depth_left - 1, out) {
                return false;
            }
        }
        true
    }

    /// The renderable substitute(s) for a coord, or `None` when nothing
    /// stored can stand in for it.
    ///
    /// Resolution order: the tile itself, then the closest ancestor, then a
    /// complete descendant covering. Tiles handed out here count as used and
    /// refresh their LRU recency.
    pub fn available_lod(&mut self, coord: TileCoord) -> Option<Vec<Renderable>> {
        let target = coord.normalize();

        if let Some(tile) = self.store_mut().get(target) {
            return Some(vec![self.renderable(TilePartial::exact(tile))]);
        }

        if let Some(ancestor) = self.closest_ancestor(target) {
            let tile = self.store_mut().get(ancestor)?;
            return Some(vec![self.renderable(TilePartial::ancestor(tile, target))]);
        }

        let tiles = self.descendants(target)?;
        Some(
            tiles
                .into_iter()
                .map(|tile| self.renderable(TilePartial::descendant(tile, target)))
                .collect(),
        )
    }

    fn renderable(&self, partial: TilePartial) -> Renderable {
        let tile_size = self.config().tile_size as f64;
        let view_offset = self.viewport().view_offset();
        Renderable {
            scale: partial.render_scale(),
            tile_offset: partial.plot_offset(tile_size, view_offset),
            uv: partial.uv_rect(),
            tile: partial.tile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{Fetch, TileLoader};
    use crate::pyramid::{NullEventSink, PyramidConfig};
    use crate::viewport::UnboundedViewport;
    use std::sync::Arc;

    struct SilentLoader;

    impl TileLoader for SilentLoader {
        fn fetch(&mut self, _coord: TileCoord) -> Fetch {
            Fetch::Deferred
        }
    }

    fn pyramid(config: PyramidConfig) -> TilePyramid {
        TilePyramid::new(
            config,
            Box::new(SilentLoader),
            Arc::new(UnboundedViewport),
            Arc::new(NullEventSink),
        )
    }

    fn seed(pyramid: &mut TilePyramid, z: u8, x: i32, y: i32) {
        pyramid
            .store_mut()
            .insert(Tile::new(TileCoord::new(z, x, y), vec![z]));
    }

    #[test]
    fn closest_ancestor_finds_the_nearest_level() {
        let mut pyramid = pyramid(PyramidConfig::default());
        seed(&mut pyramid, 0, 0, 0);
        seed(&mut pyramid, 2, 3, 1);

        let coord = TileCoord::new(4, 13, 6);
        assert_eq!(
            pyramid.closest_ancestor(coord),
            Some(TileCoord::new(2, 3, 1))
        );

        // Only the root remains after removing the closer one.
        pyramid.store_mut().remove(TileCoord::new(2, 3, 1));
        assert_eq!(pyramid.closest_ancestor(coord), Some(TileCoord::new(0, 0, 0)));
    }

    #[test]
    fn closest_ancestor_of_the_root_is_none() {
        let mut pyramid = pyramid(PyramidConfig::default());
        seed(&mut pyramid, 0, 0, 0);
        assert_eq!(pyramid.closest_ancestor(TileCoord::new(0, 0, 0)), None);
    }

    #[test]
    fn descendants_cover_with_the_four_children() {
        let mut pyramid = pyramid(PyramidConfig::default());
        for child in TileCoord::new(1, 0, 0).children() {
            seed(&mut pyramid, child.z, child.x, child.y);
        }

        let tiles = pyramid.descendants(TileCoord::new(1, 0, 0)).unwrap();
        let coords: Vec<TileCoord> = tiles.iter().map(Tile::coord).collect();
        assert_eq!(coords, TileCoord::new(1, 0, 0).children());
    }

    #[test]
    fn descendants_mix_depths_along_branches() {
        let mut pyramid = pyramid(PyramidConfig::default());
        let target = TileCoord::new(1, 0, 0);
        let children = target.children();

        // Three children stored directly; the NW child covered by its own
        // four children one level deeper.
        for child in &children[1..] {
            seed(&mut pyramid, child.z, child.x, child.y);
        }
        for grandchild in children[0].children() {
            seed(&mut pyramid, grandchild.z, grandchild.x, grandchild.y);
        }

        let tiles = pyramid.descendants(target).unwrap();
        assert_eq!(tiles.len(), 7);
        // The shallow branch resolves at depth 1, never descending further.
        assert_eq!(
            tiles.iter().filter(|tile| tile.coord().z == 2).count(),
            3
        );
        assert_eq!(
            tiles.iter().filter(|tile| tile.coord().z == 3).count(),
            4
        );
    }

    #[test]
    fn missing_branch_means_no_covering() {
        let mut pyramid = pyramid(PyramidConfig::default());
        let children = TileCoord::new(1, 0, 0).children();
        for child in &children[..3] {
            seed(&mut pyramid, child.z, child.x, child.y);
        }

        assert!(pyramid.descendants(TileCoord::new(1, 0, 0)).is_none());
    }

    #[test]
    fn descendant_search_respects_the_depth_cap() {
        let mut pyramid = pyramid(PyramidConfig::default().with_max_descendant_depth(1));
        // A full covering exists at depth 2, but the cap stops at depth 1.
        for grandchild in TileCoord::new(1, 0, 0).descendants(2) {
            seed(&mut pyramid, grandchild.z, grandchild.x, grandchild.y);
        }

        assert!(pyramid.descendants(TileCoord::new(1, 0, 0)).is_none());

        let mut deeper = pyramid_with_depth_two();
        assert!(deeper.descendants(TileCoord::new(1, 0, 0)).is_some());
    }

    fn pyramid_with_depth_two() -> TilePyramid {
        let mut pyramid = pyramid(PyramidConfig::default().with_max_descendant_depth(2));
        for grandchild in TileCoord::new(1, 0, 0).descendants(2) {
            seed(&mut pyramid, grandchild.z, grandchild.x, grandchild.y);
        }
        pyramid
    }

    #[test]
    fn exact_tile_wins_over_everything() {
        let mut pyramid = pyramid(PyramidConfig::default());
        seed(&mut pyramid, 0, 0, 0);
        seed(&mut pyramid, 2, 1, 1);

        let lod = pyramid.available_lod(TileCoord::new(2, 1, 1)).unwrap();
        assert_eq!(lod.len(), 1);
        assert_eq!(lod[0].tile.coord(), TileCoord::new(2, 1, 1));
        assert_eq!(lod[0].uv, UvRect::FULL);
        assert_eq!(lod[0].scale, 1.0);
        assert_eq!(lod[0].tile_offset, (256.0, 256.0));
    }

    #[test]
    fn ancestor_substitute_crops_to_the_target() {
        let mut pyramid = pyramid(PyramidConfig::default());
        seed(&mut pyramid, 0, 0, 0);

        let lod = pyramid.available_lod(TileCoord::new(2, 3, 1)).unwrap();
        assert_eq!(lod.len(), 1);

        let renderable = &lod[0];
        assert_eq!(renderable.tile.coord(), TileCoord::new(0, 0, 0));
        let uv = renderable.uv;
        assert_eq!((uv.u, uv.v, uv.w, uv.h), (0.75, 0.25, 0.25, 0.25));
        assert_eq!(renderable.scale, 4.0);
        assert_eq!(renderable.tile_offset, (3.0 * 256.0, 1.0 * 256.0));
    }

    #[test]
    fn ancestor_wins_over_a_descendant_covering() {
        let mut pyramid = pyramid(PyramidConfig::default());
        seed(&mut pyramid, 0, 0, 0);
        for child in TileCoord::new(1, 0, 0).children() {
            seed(&mut pyramid, child.z, child.x, child.y);
        }

        let lod = pyramid.available_lod(TileCoord::new(1, 0, 0)).unwrap();
        assert_eq!(lod.len(), 1);
        assert_eq!(lod[0].tile.coord(), TileCoord::new(0, 0, 0));
    }

    #[test]
    fn descendant_covering_yields_one_renderable_each() {
        let mut pyramid = pyramid(PyramidConfig::default());
        for child in TileCoord::new(1, 0, 0).children() {
            seed(&mut pyramid, child.z, child.x, child.y);
        }

        let lod = pyramid.available_lod(TileCoord::new(1, 0, 0)).unwrap();
        assert_eq!(lod.len(), 4);
        for renderable in &lod {
            assert_eq!(renderable.uv, UvRect::FULL);
            assert_eq!(renderable.scale, 0.5);
        }
        // Row-major placement inside the target slot.
        let offsets: Vec<(f64, f64)> = lod.iter().map(|r| r.tile_offset).collect();
        assert_eq!(
            offsets,
            vec![(0.0, 0.0), (128.0, 0.0), (0.0, 128.0), (128.0, 128.0)]
        );
    }

    #[test]
    fn nothing_available_is_none() {
        let mut pyramid = pyramid(PyramidConfig::default());
        assert!(pyramid.available_lod(TileCoord::new(3, 1, 1)).is_none());
    }

    #[test]
    fn available_lod_normalizes_the_target() {
        let mut pyramid = pyramid(PyramidConfig::default());
        seed(&mut pyramid, 0, 0, 0);

        let wrapped = TileCoord::new(2, 3 - 4, 1);
        let lod = pyramid.available_lod(wrapped).unwrap();
        let uv = lod[0].uv;
        assert_eq!((uv.u, uv.v), (0.75, 0.25));
    }
}
