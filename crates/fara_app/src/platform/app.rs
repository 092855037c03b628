use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use crawl_logging::{crawl_debug, crawl_info, crawl_warn};
use fara_core::{update, CrawlState, CrawlSummary, Msg};
use fara_engine::{
    write_summary, CrawlSettings, EngineHandle, JsonLinesSink, RecordSink, SinkError,
};

use super::effects::EffectRunner;

const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Crawls the whole listing into `settings.output_dir`.
pub fn run_crawl(settings: &CrawlSettings) -> anyhow::Result<CrawlSummary> {
    let started_utc = Utc::now().to_rfc3339();
    let engine = EngineHandle::new(settings.fetch.clone()).context("starting fetch engine")?;
    let sink = JsonLinesSink::create(&settings.output_dir)
        .with_context(|| format!("opening record output in {:?}", settings.output_dir))?;

    let (summary, sink) = drive(engine, sink, settings.max_pages)?;
    crawl_info!("Wrote {} records to {:?}", sink.records_written(), sink.path());

    let finished_utc = Utc::now().to_rfc3339();
    let path = write_summary(&settings.output_dir, &summary, &started_utc, &finished_utc)
        .context("writing crawl summary")?;
    crawl_info!("Summary written to {:?}", path);
    Ok(summary)
}

/// Feeds engine results through `update` until the crawl is complete.
pub(crate) fn drive<S: RecordSink>(
    engine: EngineHandle,
    sink: S,
    max_pages: Option<u32>,
) -> Result<(CrawlSummary, S), SinkError> {
    let mut runner = EffectRunner::new(engine, sink);
    let mut state = CrawlState::with_max_pages(max_pages);
    let mut inbox = VecDeque::from([Msg::StartRequested]);

    loop {
        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            runner.run(effects)?;
        }

        if state.consume_dirty() {
            crawl_debug!("Progress: {:?}", state.summary());
        }
        if state.is_complete() {
            break;
        }

        match runner.next_msg(IDLE_WAIT) {
            Some(msg) => inbox.push_back(msg),
            None if runner.in_flight() == 0 => {
                crawl_warn!("No fetches outstanding but crawl not complete; stopping");
                break;
            }
            None => inbox.push_back(Msg::Tick),
        }
    }

    let mut sink = runner.into_sink();
    sink.flush()?;
    let summary = state.summary();
    crawl_info!(
        "Crawl finished: {} list pages, {} records emitted, {} rejected",
        summary.pages_fetched,
        summary.emitted,
        summary.rejected
    );
    Ok((summary, sink))
}
