//! Synthetic pan session command.
//!
//! Drives a pyramid the way a viewer would: a window slides across the map
//! one column per turn, every turn requests the visible coords, and a
//! simulated network task answers fetches after a latency with deterministic
//! jitter so completions land out of order. The session ends with a report
//! of event traffic, store occupancy, and LOD coverage.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use tilepyramid::coord::{TileCoord, MAX_KEY_ZOOM};
use tilepyramid::loader::{Fetch, LoadError, TileLoader};
use tilepyramid::pyramid::{EventSink, PyramidConfig, TileEvent, TilePyramid};
use tilepyramid::viewport::ViewportQuery;

use crate::error::CliError;

/// Options for the simulate command.
pub struct SimulateOptions {
    pub zoom: u8,
    pub width: i64,
    pub height: i64,
    pub turns: u32,
    pub latency_ms: u64,
    pub cache_size: usize,
    pub persistent_levels: u8,
    pub clear_every: u32,
}

type LoadResult = (TileCoord, Result<Vec<u8>, LoadError>);

/// Loader that forwards fetches to the simulated network task.
struct ChannelLoader {
    requests: mpsc::UnboundedSender<TileCoord>,
}

impl TileLoader for ChannelLoader {
    fn fetch(&mut self, coord: TileCoord) -> Fetch {
        match self.requests.send(coord) {
            Ok(()) => Fetch::Deferred,
            Err(_) => Fetch::Ready(Err(LoadError::new("network task stopped"))),
        }
    }

    fn cancel(&mut self, coord: TileCoord) {
        // Best-effort only; the network task still answers, so the stale
        // machinery gets exercised when clears are scheduled.
        debug!(coord = %coord, "cancel requested");
    }
}

/// Simulated network: answers each fetch after latency plus per-coord
/// jitter, with an occasional synthetic failure.
async fn network(
    mut requests: mpsc::UnboundedReceiver<TileCoord>,
    results: mpsc::UnboundedSender<LoadResult>,
    base_latency: Duration,
) {
    while let Some(coord) = requests.recv().await {
        let results = results.clone();
        tokio::spawn(async move {
            let jitter = Duration::from_millis(coord.key() % 7);
            tokio::time::sleep(base_latency + jitter).await;
            let result = if coord.key() % 23 == 0 {
                Err(LoadError::new("synthetic outage"))
            } else {
                Ok(coord.key().to_be_bytes().to_vec())
            };
            let _ = results.send((coord, result));
        });
    }
}

/// Window of `width` x `height` tiles sliding eastward one column per turn.
struct SlidingViewport {
    zoom: u8,
    width: i64,
    height: i64,
    row_start: i64,
    tile_size: u32,
    col_start: Mutex<i64>,
}

impl SlidingViewport {
    fn new(zoom: u8, width: i64, height: i64, tile_size: u32) -> Self {
        let n = 1i64 << zoom;
        let row_start = (n - height).max(0) / 2;
        Self {
            zoom,
            width,
            height,
            row_start,
            tile_size,
            col_start: Mutex::new(0),
        }
    }

    fn advance(&self) {
        let n = 1i64 << self.zoom;
        let mut start = self.col_start.lock().unwrap();
        *start = (*start + 1).rem_euclid(n);
    }
}

impl ViewportQuery for SlidingViewport {
    fn is_in_view(&self, coord: TileCoord, wraparound: bool) -> bool {
        let n = 1i64 << self.zoom;

        // Project the coord's footprint onto the window zoom.
        let (col_lo, row_lo, span) = if coord.z <= self.zoom {
            let dz = self.zoom - coord.z;
            (
                (coord.x as i64) << dz,
                (coord.y as i64) << dz,
                1i64 << dz,
            )
        } else {
            let dz = coord.z - self.zoom;
            ((coord.x as i64) >> dz, (coord.y as i64) >> dz, 1)
        };

        let start = *self.col_start.lock().unwrap();
        let t = if wraparound {
            (col_lo - start).rem_euclid(n)
        } else {
            col_lo - start
        };
        let cols_hit = span >= n
            || (t < self.width && t + span > 0)
            || (wraparound && t + span > n);
        let rows_hit = row_lo < self.row_start + self.height && row_lo + span > self.row_start;
        cols_hit && rows_hit
    }

    fn target_visible_coords(&self) -> Vec<TileCoord> {
        let start = *self.col_start.lock().unwrap();
        let mut coords = Vec::with_capacity((self.width * self.height) as usize);
        for row in self.row_start..self.row_start + self.height {
            for col in start..start + self.width {
                // Columns past the antimeridian stay unwrapped; the pyramid
                // normalizes them.
                coords.push(TileCoord::new(self.zoom, col as i32, row as i32));
            }
        }
        coords
    }

    fn view_offset(&self) -> (f64, f64) {
        let start = *self.col_start.lock().unwrap();
        let size = self.tile_size as f64;
        (start as f64 * size, self.row_start as f64 * size)
    }
}

/// Sink that tallies events by wire name.
#[derive(Default)]
struct CountingSink {
    counts: Mutex<BTreeMap<&'static str, u64>>,
}

impl EventSink for CountingSink {
    fn emit(&self, event: TileEvent) {
        *self.counts.lock().unwrap().entry(event.name()).or_insert(0) += 1;
    }
}

/// Run the synthetic pan session.
pub fn run_simulate(options: SimulateOptions) -> Result<(), CliError> {
    if options.zoom > MAX_KEY_ZOOM {
        return Err(CliError::Config(format!(
            "zoom must be at most {}",
            MAX_KEY_ZOOM
        )));
    }
    if options.width < 1 || options.height < 1 {
        return Err(CliError::Config(
            "window width and height must be at least 1".to_string(),
        ));
    }
    if options.height > 1i64 << options.zoom {
        return Err(CliError::Config(format!(
            "window height {} exceeds the map at zoom {}",
            options.height, options.zoom
        )));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_session(options))
}

async fn run_session(options: SimulateOptions) -> Result<(), CliError> {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();
    tokio::spawn(network(
        request_rx,
        result_tx,
        Duration::from_millis(options.latency_ms),
    ));

    let viewport = Arc::new(SlidingViewport::new(
        options.zoom,
        options.width,
        options.height,
        256,
    ));
    let sink = Arc::new(CountingSink::default());
    let config = PyramidConfig::default()
        .with_cache_size(options.cache_size)
        .with_persistent_levels(options.persistent_levels)
        .with_zoom_band(0, options.zoom);
    let view_adapter: Arc<dyn ViewportQuery> = viewport.clone();
    let event_sink: Arc<dyn EventSink> = sink.clone();
    let mut pyramid = TilePyramid::new(
        config,
        Box::new(ChannelLoader {
            requests: request_tx,
        }),
        view_adapter,
        event_sink,
    );

    println!("tilepyramid simulate v{}", tilepyramid::VERSION);
    println!(
        "zoom {}, window {}x{}, {} turns, {}ms latency",
        options.zoom, options.width, options.height, options.turns, options.latency_ms
    );
    println!();

    let turn = Duration::from_millis(options.latency_ms.max(1));
    for step in 0..options.turns {
        if options.clear_every > 0 && step > 0 && step % options.clear_every == 0 {
            pyramid.clear();
        }
        viewport.advance();
        pyramid.request_tiles(&viewport.target_visible_coords());

        tokio::time::sleep(turn).await;
        while let Ok((coord, result)) = result_rx.try_recv() {
            pyramid.complete(coord, result);
        }
    }

    // Let stragglers land so the report reflects a settled pyramid.
    tokio::time::sleep(Duration::from_millis(options.latency_ms * 2 + 20)).await;
    while let Ok((coord, result)) = result_rx.try_recv() {
        pyramid.complete(coord, result);
    }

    report(&mut pyramid, &viewport, &sink);
    Ok(())
}

fn report(pyramid: &mut TilePyramid, viewport: &SlidingViewport, sink: &CountingSink) {
    println!("events:");
    for (name, count) in sink.counts.lock().unwrap().iter() {
        println!("  {:<14} {:>6}", name, count);
    }

    let stats = pyramid.store_stats();
    println!();
    println!(
        "store: {} tiles ({} pinned, {} volatile), {} evictions, {} pending",
        pyramid.len(),
        stats.persistent,
        stats.volatile,
        stats.evictions,
        pyramid.pending_len()
    );

    let mut exact = 0u32;
    let mut substituted = 0u32;
    let mut missing = 0u32;
    for coord in viewport.target_visible_coords() {
        match pyramid.available_lod(coord) {
            Some(renderables)
                if renderables.len() == 1
                    && renderables[0].tile.coord() == coord.normalize() =>
            {
                exact += 1
            }
            Some(_) => substituted += 1,
            None => missing += 1,
        }
    }
    println!(
        "view coverage: {} exact, {} substituted, {} missing",
        exact, substituted, missing
    );
}
