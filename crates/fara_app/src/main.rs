mod platform;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fara_engine::CrawlSettings;

use platform::logging::LogTarget;

#[derive(Debug, Parser)]
#[command(name = "fara_principals")]
#[command(about = "Crawl the FARA active foreign principals listing into JSON lines")]
struct Cli {
    /// RON settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for principals.jsonl, summary.json and crawl.log
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Stop after this many list pages
    #[arg(long)]
    max_pages: Option<u32>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    log: LogTarget,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Result<CrawlSettings> {
        let mut settings = match &self.config {
            Some(path) => CrawlSettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => CrawlSettings::default(),
        };
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if self.max_pages.is_some() {
            settings.max_pages = self.max_pages;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    platform::logging::initialize(cli.log, cli.verbose, &settings.output_dir);

    let summary = platform::run_crawl(&settings)?;
    if summary.rejected > 0 {
        eprintln!("{} principals could not be assembled; see the log", summary.rejected);
    }
    Ok(())
}
