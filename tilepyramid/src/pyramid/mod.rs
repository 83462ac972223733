//! The tile pyramid core.
//!
//! This module ties the store, the request registries, and the substitution
//! search together behind the [`TilePyramid`] type and its event surface.
//!
//! # Lifecycle
//!
//! The enclosing layer feeds visible coords into
//! [`TilePyramid::request_tiles`]; the pyramid dispatches the missing ones to
//! the loader, classifies each response as fresh, stale, or unsolicited, and
//! emits [`TileEvent`]s as state changes. The renderer asks
//! [`TilePyramid::available_lod`] for a substitute per visible coord.

mod config;
mod core;
mod events;
mod lod;
mod pending;

pub use self::config::PyramidConfig;
pub use self::core::TilePyramid;
pub use self::events::{EventSink, NullEventSink, TileEvent};
pub use self::lod::Renderable;
