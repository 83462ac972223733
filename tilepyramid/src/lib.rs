//! tilepyramid - tile caching, scheduling, and LOD substitution
//!
//! This library is the working-set core of an interactive slippy-map viewer:
//! it decides which tiles to request, deduplicates and cancels in-flight
//! loads as the viewport moves, retains a bounded cache with the low zoom
//! levels pinned as a permanent fallback, and answers every visible coord
//! with either its tile or a renderable substitute cut from an ancestor or
//! assembled from descendants.
//!
//! The pyramid is transport-agnostic: tiles arrive through a user-supplied
//! [`TileLoader`](loader::TileLoader), visibility is delegated to a
//! [`ViewportQuery`](viewport::ViewportQuery) adapter, and lifecycle events
//! flow into an [`EventSink`](pyramid::EventSink).
//!
//! # Example
//!
//! ```ignore
//! use tilepyramid::coord::TileCoord;
//! use tilepyramid::pyramid::{PyramidConfig, TilePyramid};
//!
//! let mut pyramid = TilePyramid::new(PyramidConfig::default(), loader, viewport, events);
//!
//! // On viewport change: ask for what the view needs.
//! pyramid.request_tiles(&visible_coords);
//!
//! // Per frame: draw the best available substitute for each coord.
//! for coord in visible_coords {
//!     if let Some(renderables) = pyramid.available_lod(coord) {
//!         // draw them
//!     }
//! }
//! ```

pub mod cache;
pub mod coord;
pub mod loader;
pub mod pyramid;
pub mod tile;
pub mod viewport;

/// Version of the tilepyramid library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
