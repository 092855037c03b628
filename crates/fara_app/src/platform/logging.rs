//! Logger setup for the `fara_principals` binary.
//!
//! File output goes to `crawl.log` inside the output directory.

use std::path::Path;

use clap::ValueEnum;
use crawl_logging::LogDestination;
use fara_engine::ensure_output_dir;
use log::LevelFilter;

const LOG_FILENAME: &str = "crawl.log";

/// Where `--log` sends output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

pub fn initialize(target: LogTarget, verbose: bool, output_dir: &Path) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    if target != LogTarget::Terminal {
        if let Err(err) = ensure_output_dir(output_dir) {
            eprintln!("Warning: {err}");
        }
    }
    crawl_logging::initialize(target.into(), level, &output_dir.join(LOG_FILENAME));
}
