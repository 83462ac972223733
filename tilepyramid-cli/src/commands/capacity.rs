//! Capacity calculator command.

use crate::error::CliError;
use tilepyramid::coord::MAX_KEY_ZOOM;
use tilepyramid::pyramid::PyramidConfig;

/// Print the store capacity breakdown for a configuration.
pub fn run_capacity(cache_size: usize, persistent_levels: u8) -> Result<(), CliError> {
    if persistent_levels > MAX_KEY_ZOOM {
        return Err(CliError::Config(format!(
            "persistent-levels must be at most {}",
            MAX_KEY_ZOOM
        )));
    }

    let config = PyramidConfig::default()
        .with_cache_size(cache_size)
        .with_persistent_levels(persistent_levels);

    println!("Volatile LRU:       {:>8} tiles", config.cache_size);
    println!(
        "Pinned (z 0..={}):   {:>8} tiles",
        config.persistent_levels,
        config.num_persistent_tiles()
    );
    println!("Total capacity:     {:>8} tiles", config.capacity());
    Ok(())
}
