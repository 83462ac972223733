//! Loader interface.
//!
//! The pyramid is transport-agnostic: tiles come from whatever the enclosing
//! layer plugs in here. A loader either answers a fetch on the spot
//! ([`Fetch::Ready`]) or defers and later hands the result to
//! [`TilePyramid::complete`](crate::pyramid::TilePyramid::complete) for the
//! same coordinate. Exactly one result must be produced per fetch.

use crate::coord::TileCoord;
use thiserror::Error;

/// Failure reported by a loader for a single tile fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tile load failed: {message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Create a load error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The loader's failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of starting a fetch.
#[derive(Debug)]
pub enum Fetch {
    /// The loader resolved synchronously; the result flows through the same
    /// path a deferred completion would take.
    Ready(Result<Vec<u8>, LoadError>),
    /// The loader will deliver the result later via `complete`.
    Deferred,
}

/// User-supplied tile source.
///
/// The pyramid calls [`fetch`](TileLoader::fetch) once per dispatched
/// coordinate, always with a normalized coord. Cancellation via
/// [`cancel`](TileLoader::cancel) is best-effort: the pyramid discards late
/// results on its own and does not depend on the loader honoring it.
pub trait TileLoader {
    /// Begin fetching the payload for `coord`.
    fn fetch(&mut self, coord: TileCoord) -> Fetch;

    /// Notification that a previously fetched coord is no longer wanted.
    fn cancel(&mut self, coord: TileCoord) {
        let _ = coord;
    }
}
