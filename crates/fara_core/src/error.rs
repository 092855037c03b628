use thiserror::Error;

/// Failures raised by page parsing and record validation.
///
/// `PaginationEnded` is the expected terminal signal of the list walk rather than
/// a fault; use [`FaraError::is_pagination_end`] to tell it apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaraError {
    #[error("session token `{token}` not found on page")]
    SessionTokenMissing { token: &'static str },
    #[error("no principals left to request page {page}; pagination ended")]
    PaginationEnded { page: u32 },
    #[error("invalid principal: `{field}` {reason}")]
    InvalidPrincipal {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid exhibit: `{field}` is missing or empty")]
    InvalidExhibit { field: &'static str },
    #[error("country index {index} is claimed by several headers: {names:?}")]
    AmbiguousCountry { index: u32, names: Vec<String> },
    #[error("principal link `{href}` cannot be resolved: {message}")]
    InvalidLink { href: String, message: String },
}

impl FaraError {
    pub fn is_pagination_end(&self) -> bool {
        matches!(self, FaraError::PaginationEnded { .. })
    }

    pub(crate) fn missing_field(field: &'static str) -> Self {
        FaraError::InvalidPrincipal {
            field,
            reason: "is missing",
        }
    }

    pub(crate) fn blank_field(field: &'static str) -> Self {
        FaraError::InvalidPrincipal {
            field,
            reason: "is empty",
        }
    }
}
