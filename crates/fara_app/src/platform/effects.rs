use std::collections::HashMap;
use std::time::Duration;

use crawl_logging::{crawl_debug, crawl_error, crawl_info, crawl_warn};
use fara_core::{Effect, JobId, Msg, PartialPrincipal, SessionContext};
use fara_engine::{EngineEvent, EngineHandle, PageRequest, RecordSink, SinkError};

/// What a fetch was issued for, so its result can be turned back into a `Msg`.
enum PendingFetch {
    ListPage {
        url: String,
        context: Option<SessionContext>,
    },
    DetailPage {
        job_id: JobId,
        principal: PartialPrincipal,
    },
}

/// Carries out effects against the engine and a record sink, and turns engine
/// events back into messages for `update`.
pub(crate) struct EffectRunner<S> {
    engine: EngineHandle,
    sink: S,
    pending: HashMap<u64, PendingFetch>,
    next_fetch_id: u64,
}

impl<S: RecordSink> EffectRunner<S> {
    pub(crate) fn new(engine: EngineHandle, sink: S) -> Self {
        Self {
            engine,
            sink,
            pending: HashMap::new(),
            next_fetch_id: 0,
        }
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) -> Result<(), SinkError> {
        for effect in effects {
            match effect {
                Effect::StartSession => {
                    crawl_info!("Starting crawl session");
                }
                Effect::FetchEntryPage { url } => {
                    crawl_info!("FetchEntryPage url={}", url);
                    self.submit(
                        PageRequest::Get { url: url.clone() },
                        PendingFetch::ListPage { url, context: None },
                    );
                }
                Effect::FetchListPage { request, context } => {
                    crawl_info!(
                        "FetchListPage page={} window={}",
                        context.page_number(),
                        request.field("p_widget_action_mod").unwrap_or_default()
                    );
                    self.submit(
                        PageRequest::PostForm {
                            url: request.url.clone(),
                            form: request.form,
                        },
                        PendingFetch::ListPage {
                            url: request.url,
                            context: Some(context),
                        },
                    );
                }
                Effect::FetchDetailPage {
                    job_id,
                    url,
                    principal,
                } => {
                    crawl_debug!("FetchDetailPage job_id={} url={}", job_id, url);
                    self.submit(
                        PageRequest::Get { url },
                        PendingFetch::DetailPage { job_id, principal },
                    );
                }
                Effect::EmitRecord { job_id, record } => {
                    crawl_debug!(
                        "EmitRecord job_id={} reg_number={} exhibits={}",
                        job_id,
                        record.reg_number,
                        record.exhibit.len()
                    );
                    self.sink.accept(&record)?;
                }
                Effect::RecordRejected { job_id, failure } => {
                    crawl_warn!("Record for job {} rejected: {}", job_id, failure);
                }
                Effect::ReportError { failure } => {
                    crawl_error!("List walk stopped: {}", failure);
                }
            }
        }
        Ok(())
    }

    /// Waits up to `timeout` for the next finished fetch.
    pub(crate) fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let EngineEvent::FetchCompleted { job_id, result } = self.engine.recv_timeout(timeout)?;
        let Some(pending) = self.pending.remove(&job_id) else {
            crawl_warn!("Engine reported unknown fetch {}", job_id);
            return Some(Msg::NoOp);
        };

        let msg = match (pending, result) {
            (PendingFetch::ListPage { url, context }, Ok(page)) => Msg::ListPageFetched {
                url,
                body: page.body,
                context,
            },
            (PendingFetch::ListPage { url, .. }, Err(err)) => Msg::ListPageFailed {
                url,
                message: err.to_string(),
            },
            (PendingFetch::DetailPage { job_id, principal }, Ok(page)) => {
                Msg::DetailPageFetched {
                    job_id,
                    principal,
                    body: page.body,
                }
            }
            (PendingFetch::DetailPage { job_id, principal }, Err(err)) => {
                Msg::DetailPageFailed {
                    job_id,
                    principal,
                    message: err.to_string(),
                }
            }
        };
        Some(msg)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn into_sink(self) -> S {
        self.sink
    }

    fn submit(&mut self, request: PageRequest, pending: PendingFetch) {
        self.next_fetch_id += 1;
        self.pending.insert(self.next_fetch_id, pending);
        self.engine.fetch(self.next_fetch_id, request);
    }
}
