use std::collections::BTreeSet;

use crate::summary::CrawlSummary;

pub type JobId = u64;

/// Where the list walk stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlPhase {
    #[default]
    Start,
    /// Entry page requested; no session context yet.
    FetchingEntry,
    /// Session context known; list pages are requested one after another.
    Paginating,
    /// No further list pages will be requested.
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlState {
    phase: CrawlPhase,
    max_pages: Option<u32>,
    list_page_pending: bool,
    pages_fetched: u32,
    next_job_id: JobId,
    details_in_flight: BTreeSet<JobId>,
    emitted: usize,
    rejected: usize,
    dirty: bool,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops pagination after `max_pages` list pages have been read.
    pub fn with_max_pages(max_pages: Option<u32>) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// True once pagination has ended and every requested page has been settled.
    pub fn is_complete(&self) -> bool {
        self.phase == CrawlPhase::Ended
            && !self.list_page_pending
            && self.details_in_flight.is_empty()
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            phase: self.phase,
            pages_fetched: self.pages_fetched,
            list_page_pending: self.list_page_pending,
            details_in_flight: self.details_in_flight.len(),
            emitted: self.emitted,
            rejected: self.rejected,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_entry_fetch(&mut self) {
        self.phase = CrawlPhase::FetchingEntry;
        self.list_page_pending = true;
        self.dirty = true;
    }

    pub(crate) fn expects_list_page(&self) -> bool {
        self.list_page_pending
    }

    pub(crate) fn settle_list_page(&mut self, fetched: bool) {
        self.list_page_pending = false;
        if fetched {
            self.pages_fetched += 1;
        }
        self.dirty = true;
    }

    /// Entry page parsed; the session is usable from here on.
    pub(crate) fn context_established(&mut self) {
        if self.phase == CrawlPhase::FetchingEntry {
            self.phase = CrawlPhase::Paginating;
            self.dirty = true;
        }
    }

    pub(crate) fn is_paginating(&self) -> bool {
        self.phase == CrawlPhase::Paginating
    }

    pub(crate) fn reached_max_pages(&self) -> bool {
        self.max_pages
            .is_some_and(|max_pages| self.pages_fetched >= max_pages)
    }

    pub(crate) fn request_list_page(&mut self) {
        self.list_page_pending = true;
        self.dirty = true;
    }

    pub(crate) fn end_pagination(&mut self) {
        if self.phase != CrawlPhase::Ended {
            self.phase = CrawlPhase::Ended;
            self.dirty = true;
        }
    }

    pub(crate) fn allocate_job(&mut self) -> JobId {
        self.next_job_id += 1;
        self.next_job_id
    }

    pub(crate) fn track_detail_fetch(&mut self, job_id: JobId) {
        self.details_in_flight.insert(job_id);
        self.dirty = true;
    }

    /// Returns false for a job that was never requested or already settled.
    pub(crate) fn settle_detail_fetch(&mut self, job_id: JobId) -> bool {
        let known = self.details_in_flight.remove(&job_id);
        self.dirty |= known;
        known
    }

    pub(crate) fn record_emitted(&mut self) {
        self.emitted += 1;
        self.dirty = true;
    }

    pub(crate) fn record_rejected(&mut self) {
        self.rejected += 1;
        self.dirty = true;
    }
}
