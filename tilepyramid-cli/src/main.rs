//! tilepyramid CLI - diagnostic command-line interface
//!
//! This binary drives the tilepyramid library without a real viewer
//! attached: a scripted pan session against a synthetic loader for watching
//! the request/discard/evict machinery behave, and a capacity calculator for
//! sizing configurations.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilepyramid")]
#[command(version = tilepyramid::VERSION)]
#[command(about = "Tile pyramid diagnostics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a synthetic pan session against a simulated loader
    Simulate {
        /// Zoom level the window pans at
        #[arg(long, default_value = "6")]
        zoom: u8,

        /// Window width in tiles
        #[arg(long, default_value = "4")]
        width: i64,

        /// Window height in tiles
        #[arg(long, default_value = "3")]
        height: i64,

        /// Number of pan steps to simulate
        #[arg(long, default_value = "48")]
        turns: u32,

        /// Base simulated loader latency in milliseconds
        #[arg(long, default_value = "15")]
        latency_ms: u64,

        /// Volatile cache capacity
        #[arg(long, default_value = "256")]
        cache_size: usize,

        /// Zoom threshold at or below which tiles are pinned
        #[arg(long, default_value = "4")]
        persistent_levels: u8,

        /// Cancel everything every N turns (0 = never)
        #[arg(long, default_value = "0")]
        clear_every: u32,
    },

    /// Print the store capacity for a configuration
    Capacity {
        /// Volatile cache capacity
        #[arg(long, default_value = "256")]
        cache_size: usize,

        /// Zoom threshold at or below which tiles are pinned
        #[arg(long, default_value = "4")]
        persistent_levels: u8,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            zoom,
            width,
            height,
            turns,
            latency_ms,
            cache_size,
            persistent_levels,
            clear_every,
        } => commands::run_simulate(commands::SimulateOptions {
            zoom,
            width,
            height,
            turns,
            latency_ms,
            cache_size,
            persistent_levels,
            clear_every,
        }),
        Commands::Capacity {
            cache_size,
            persistent_levels,
        } => commands::run_capacity(cache_size, persistent_levels),
    };

    if let Err(e) = result {
        e.exit();
    }
}
