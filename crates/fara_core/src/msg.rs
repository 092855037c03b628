use crate::{JobId, PartialPrincipal, SessionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the crawl from the entry page.
    StartRequested,
    /// A list page body arrived. `context` is the context the request was made
    /// with; `None` for the entry page.
    ListPageFetched {
        url: String,
        body: String,
        context: Option<SessionContext>,
    },
    /// The transport could not deliver a list page.
    ListPageFailed { url: String, message: String },
    /// A detail page body arrived for the principal it was requested for.
    DetailPageFetched {
        job_id: JobId,
        principal: PartialPrincipal,
        body: String,
    },
    /// The transport could not deliver a detail page.
    DetailPageFailed {
        job_id: JobId,
        principal: PartialPrincipal,
        message: String,
    },
    /// Stop paginating; detail pages already requested still complete.
    StopRequested,
    /// Periodic wake-up from the driver loop.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
