use crate::CrawlPhase;

/// Progress counters for display and the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlSummary {
    pub phase: CrawlPhase,
    pub pages_fetched: u32,
    pub list_page_pending: bool,
    pub details_in_flight: usize,
    pub emitted: usize,
    pub rejected: usize,
}
