use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crawl_logging::crawl_debug;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::decode::decode_page;
use crate::fetch::{FetchSettings, PageFetcher, ReqwestFetcher};
use crate::{EngineEvent, FailureKind, FetchError, FetchedPage, JobId, PageRequest};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("could not build http client: {0}")]
    Client(#[from] FetchError),
}

enum EngineCommand {
    Fetch { job_id: JobId, request: PageRequest },
}

/// Runs page fetches on a background tokio runtime.
///
/// Requests go in through [`EngineHandle::fetch`]; every request produces
/// exactly one [`EngineEvent::FetchCompleted`], including after [`stop`](Self::stop).
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Result<Self, EngineError> {
        let concurrency = settings.max_concurrent_requests;
        let fetcher = ReqwestFetcher::new(settings)?;
        Self::with_fetcher(Arc::new(fetcher), concurrency)
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn PageFetcher>,
        max_concurrent_requests: usize,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let permits = Arc::new(Semaphore::new(max_concurrent_requests.max(1)));

        let worker_cancel = cancel.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let event_tx = event_tx.clone();
                let cancel = worker_cancel.clone();
                let permits = permits.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), command, event_tx, cancel, &permits).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    pub fn fetch(&self, job_id: JobId, request: PageRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch { job_id, request });
    }

    /// Cancels pending and future fetches; each still reports `Cancelled`.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    fetcher: &dyn PageFetcher,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
    permits: &Semaphore,
) {
    match command {
        EngineCommand::Fetch { job_id, request } => {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    Err(FetchError::new(FailureKind::Cancelled, "engine stopped"))
                }
                result = fetch_page(fetcher, &request, permits) => result,
            };
            if let Err(err) = &result {
                crawl_debug!("Job {job_id} {} {} failed: {err}", request.method(), request.url());
            }
            let _ = event_tx.send(EngineEvent::FetchCompleted { job_id, result });
        }
    }
}

async fn fetch_page(
    fetcher: &dyn PageFetcher,
    request: &PageRequest,
    permits: &Semaphore,
) -> Result<FetchedPage, FetchError> {
    let _permit = permits
        .acquire()
        .await
        .map_err(|err| FetchError::new(FailureKind::Cancelled, err.to_string()))?;
    let output = fetcher.fetch(request).await?;
    let decoded = decode_page(&output.bytes, output.metadata.content_type.as_deref())
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    Ok(FetchedPage {
        body: decoded.text,
        encoding_label: decoded.encoding_label,
        metadata: output.metadata,
    })
}
