//! FARA core: page parsing, record assembly and the pure crawl state machine.
//!
//! Nothing in this crate performs I/O. Callers hand in fetched page bodies and
//! the session context carried from earlier pages; they get back records,
//! errors and the [`Effect`]s describing what to fetch next.
mod effect;
mod error;
mod exhibit_page;
mod html;
mod list_page;
mod msg;
mod pagination;
mod record;
mod session;
mod state;
mod summary;
mod update;

pub use effect::{CrawlFailure, Effect};
pub use error::FaraError;
pub use exhibit_page::ExhibitPage;
pub use list_page::{CountryHeader, ListPage, PrincipalRow};
pub use msg::Msg;
pub use pagination::{next_page_request, NextPageRequest, RowWindow, ROWS_PER_PAGE};
pub use record::{
    ExhibitRecord, ExhibitStatus, FullPrincipal, PartialPrincipal, Principal, PrincipalFields,
    PrincipalRecord,
};
pub use session::{SessionContext, SessionToken, DETAIL_BASE_URL, ENTRY_URL, NEXT_PAGE_URL};
pub use state::{CrawlPhase, CrawlState, JobId};
pub use summary::CrawlSummary;
pub use update::update;
