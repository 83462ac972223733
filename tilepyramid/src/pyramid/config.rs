//! Pyramid configuration.

/// Tunable parameters of a [`TilePyramid`](crate::pyramid::TilePyramid).
#[derive(Debug, Clone)]
pub struct PyramidConfig {
    /// Capacity of the volatile LRU region (default: 256).
    pub cache_size: usize,
    /// Zoom threshold at or below which tiles are pinned (default: 4).
    pub persistent_levels: u8,
    /// Lowest zoom accepted by `request_tiles` (default: 0).
    pub min_zoom: u8,
    /// Highest zoom accepted by `request_tiles` (default: 22).
    pub max_zoom: u8,
    /// How many levels below a target the descendant search may go
    /// (default: 3).
    pub max_descendant_depth: u8,
    /// Tile edge length in plot pixels (default: 256).
    pub tile_size: u32,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            cache_size: 256,
            persistent_levels: 4,
            min_zoom: 0,
            max_zoom: 22,
            max_descendant_depth: 3,
            tile_size: 256,
        }
    }
}

impl PyramidConfig {
    /// Set the volatile LRU capacity.
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Set the pinned zoom threshold.
    pub fn with_persistent_levels(mut self, persistent_levels: u8) -> Self {
        self.persistent_levels = persistent_levels;
        self
    }

    /// Set the accepted zoom band.
    pub fn with_zoom_band(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the descendant search depth cap.
    pub fn with_max_descendant_depth(mut self, depth: u8) -> Self {
        self.max_descendant_depth = depth;
        self
    }

    /// Set the tile edge length in plot pixels.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Number of tiles the pinned region can hold: one full level per zoom
    /// from 0 through `persistent_levels`, `(4^(P+1) - 1) / 3` in total.
    pub fn num_persistent_tiles(&self) -> usize {
        ((4u64.pow(self.persistent_levels as u32 + 1) - 1) / 3) as usize
    }

    /// Total store capacity: volatile LRU plus the pinned region.
    pub fn capacity(&self) -> usize {
        self.cache_size + self.num_persistent_tiles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = PyramidConfig::default();
        assert_eq!(config.cache_size, 256);
        assert_eq!(config.persistent_levels, 4);
        assert_eq!(config.min_zoom, 0);
        assert_eq!(config.max_zoom, 22);
        assert_eq!(config.max_descendant_depth, 3);
        assert_eq!(config.tile_size, 256);
    }

    #[test]
    fn builder_overrides() {
        let config = PyramidConfig::default()
            .with_cache_size(16)
            .with_persistent_levels(2)
            .with_zoom_band(3, 12)
            .with_max_descendant_depth(1)
            .with_tile_size(512);

        assert_eq!(config.cache_size, 16);
        assert_eq!(config.persistent_levels, 2);
        assert_eq!(config.min_zoom, 3);
        assert_eq!(config.max_zoom, 12);
        assert_eq!(config.max_descendant_depth, 1);
        assert_eq!(config.tile_size, 512);
    }

    #[test]
    fn persistent_region_is_a_geometric_sum() {
        // 1 + 4 + 16 + 64 + 256 tiles for the default five levels.
        assert_eq!(PyramidConfig::default().num_persistent_tiles(), 341);
        assert_eq!(
            PyramidConfig::default()
                .with_persistent_levels(0)
                .num_persistent_tiles(),
            1
        );
    }

    #[test]
    fn capacity_adds_both_regions() {
        let config = PyramidConfig::default();
        assert_eq!(config.capacity(), 256 + 341);

        let small = PyramidConfig::default()
            .with_cache_size(2)
            .with_persistent_levels(1);
        assert_eq!(small.capacity(), 2 + 5);
    }
}
