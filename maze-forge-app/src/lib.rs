//! Maze Forge Application Library
//!
//! Configuration, logging, execution modes and output for the
//! `maze-forge` command line tool.

pub mod benchmark;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod setup;
pub mod visualization;

use anyhow::Context;
use clap::Parser;

pub use config::AppConfig;
pub use error::AppError;

/// Parses the command line, initializes logging and runs the selected mode.
pub fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(&config);

    log::info!("Maze Forge App Starting");
    log::debug!("Loaded Config: {:?}", config);

    if config.benchmark_runs > 0 {
        setup::execution::run_benchmark_mode(&config).context("Benchmark mode failed")?;
    } else {
        setup::execution::run_standard_mode(&config).context("Maze generation failed")?;
    }

    log::info!("Maze Forge App Finished.");
    Ok(())
}
