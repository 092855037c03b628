//! FARA engine: HTTP transport, decoding, configuration and record output.
mod config;
mod decode;
mod engine;
mod fetch;
mod persist;
mod sink;
mod types;

pub use config::{ConfigError, CrawlSettings};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use engine::{EngineError, EngineHandle};
pub use fetch::{FetchSettings, PageFetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use sink::{
    write_summary, JsonLinesSink, MemorySink, RecordSink, SinkError, RECORDS_FILENAME,
    SUMMARY_FILENAME,
};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, FetchedPage, JobId,
    PageRequest,
};
