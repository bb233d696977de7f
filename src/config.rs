use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Summarize criterion `raw.csv` measurements into one table per benchmark group.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Config {
    /// Directory criterion writes its measurements to
    #[arg(long, default_value = "target/criterion")]
    pub root: PathBuf,
    /// Directory the summary tables are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Prefix of every summary file name, followed by the group name
    #[arg(long, default_value = "benchmark_")]
    pub prefix: String,
    /// Fail when no input files are found instead of writing nothing
    #[arg(long)]
    pub require_inputs: bool,
    /// More logging; repeat for trace output. RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["critsum"])
    }
}
