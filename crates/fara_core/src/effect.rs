use std::fmt;

use crate::{FaraError, JobId, NextPageRequest, PartialPrincipal, PrincipalRecord, SessionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartSession,
    FetchEntryPage {
        url: String,
    },
    /// POST `request`; the response is delivered back with `context` attached.
    FetchListPage {
        request: NextPageRequest,
        context: SessionContext,
    },
    FetchDetailPage {
        job_id: JobId,
        url: String,
        principal: PartialPrincipal,
    },
    EmitRecord {
        job_id: JobId,
        record: PrincipalRecord,
    },
    RecordRejected {
        job_id: JobId,
        failure: CrawlFailure,
    },
    /// A list page could not be used; pagination has stopped.
    ReportError {
        failure: CrawlFailure,
    },
}

/// Why a page or record was given up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlFailure {
    Parse(FaraError),
    Fetch { message: String },
}

impl fmt::Display for CrawlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlFailure::Parse(err) => write!(f, "{err}"),
            CrawlFailure::Fetch { message } => write!(f, "fetch failed: {message}"),
        }
    }
}

impl From<FaraError> for CrawlFailure {
    fn from(err: FaraError) -> Self {
        CrawlFailure::Parse(err)
    }
}
