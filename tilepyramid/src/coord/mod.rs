//! Tile coordinate module
//!
//! Provides the quadtree tile coordinate used throughout the pyramid, with
//! horizontal wrap normalization, packed hashing, and ancestry walks.

mod types;

pub use types::{TileCoord, MAX_KEY_ZOOM};
