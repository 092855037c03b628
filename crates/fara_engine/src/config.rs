use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crawl_logging::crawl_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FetchSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Crawl configuration, read from a RON file. Every field may be omitted.
///
/// ```ron
/// (
///     fetch: (request_timeout_secs: 60.0, max_concurrent_requests: 2),
///     output_dir: "fara_output",
///     max_pages: Some(3),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlSettings {
    pub fetch: FetchSettings,
    pub output_dir: PathBuf,
    /// Stop paginating after this many list pages.
    pub max_pages: Option<u32>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            output_dir: PathBuf::from("output"),
            max_pages: None,
        }
    }
}

impl CrawlSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_ron(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        crawl_info!("Loaded crawl settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }
}
