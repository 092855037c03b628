use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crawl_logging::crawl_info;
use fara_core::{CrawlSummary, PrincipalRecord};
use serde_json::json;
use thiserror::Error;

use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};

pub const RECORDS_FILENAME: &str = "principals.jsonl";
pub const SUMMARY_FILENAME: &str = "summary.json";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Destination for records the crawl emits.
pub trait RecordSink {
    fn accept(&mut self, record: &PrincipalRecord) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn records_written(&self) -> usize;
}

/// Writes one JSON object per line to `principals.jsonl`, truncating any earlier run.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl JsonLinesSink {
    pub fn create(output_dir: &Path) -> Result<Self, SinkError> {
        ensure_output_dir(output_dir)?;
        let path = output_dir.join(RECORDS_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        crawl_info!("Writing records to {:?}", path);
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn accept(&mut self, record: &PrincipalRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    fn records_written(&self) -> usize {
        self.written
    }
}

/// Keeps records in memory; for embedding the crawl in another program.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<PrincipalRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PrincipalRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PrincipalRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn accept(&mut self, record: &PrincipalRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn records_written(&self) -> usize {
        self.records.len()
    }
}

/// Atomically writes `summary.json` describing a finished crawl.
pub fn write_summary(
    output_dir: &Path,
    summary: &CrawlSummary,
    started_utc: &str,
    finished_utc: &str,
) -> Result<PathBuf, SinkError> {
    let document = json!({
        "phase": format!("{:?}", summary.phase),
        "pages_fetched": summary.pages_fetched,
        "emitted": summary.emitted,
        "rejected": summary.rejected,
        "details_in_flight": summary.details_in_flight,
        "records_file": RECORDS_FILENAME,
        "started_utc": started_utc,
        "finished_utc": finished_utc,
    });
    let content = serde_json::to_vec_pretty(&document)?;
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    Ok(writer.write(SUMMARY_FILENAME, &content)?)
}
