//! Summaries of criterion benchmark runs.
//!
//! Reads every `<root>/<group>/<benchmark>/new/raw.csv` criterion leaves behind,
//! averages the per-iteration samples of each `(group, value)` pair and writes
//! one `input,throughput,duration` table per group.

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod error;
pub mod record;
pub mod units;

use std::path::PathBuf;

use log::{info, warn};

pub use aggregator::{BenchmarkAggregator, OutputRow};
pub use config::Config;
pub use error::{AggregateError, Result};

/// Reads all inputs under `config.root`, then writes the summaries.
///
/// Nothing is written unless every input was read without error.
pub fn run(config: &Config) -> Result<Vec<PathBuf>> {
    info!("Reading input data...");
    let inputs = discovery::find_inputs(&config.root)?;
    if inputs.is_empty() {
        let pattern = discovery::input_pattern(&config.root);
        if config.require_inputs {
            return Err(AggregateError::MissingInputFiles { pattern });
        }
        warn!("No input files match {}", pattern);
    }

    let mut aggregator = BenchmarkAggregator::new();
    for path in &inputs {
        info!("Processing file {}...", path.display());
        aggregator.process(path)?;
    }
    info!("Done!");

    info!("Writing results...");
    let written = aggregator.emit(&config.output_dir, &config.prefix)?;
    info!("Done writing results!");
    Ok(written)
}
