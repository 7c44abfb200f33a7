//! Iterates 100 items with a 30-cell bar that redraws every 5 items.
//!
//! Run with `RUST_LOG=debug` to see the crate's diagnostics on stderr.

use std::{thread, time::Duration};

use micro_progress::{ProgressConfig, ProgressIteratorExt};

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = ProgressConfig::new("Processing")
        .with_bar_width(30)
        .with_update_stride(5);

    for _ in (0..100).progress_with(config) {
        // Simulate a task taking time
        thread::sleep(Duration::from_millis(100));
    }
}
