use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::{SessionContext, NEXT_PAGE_URL};

/// Principals per list page; the server pages in fixed windows of this size.
pub const ROWS_PER_PAGE: u32 = 15;

/// The slice of the full principal list a page request asks for.
///
/// Row numbers are `u64` so every `u32` page number maps to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub min_row: u64,
    pub max_row: u64,
    pub rows_fetched: u32,
}

impl RowWindow {
    /// Window for a 1-based page number. Page 0 is treated as page 1.
    pub fn for_page(page_number: u32) -> Self {
        let page = u64::from(page_number.max(1));
        let rows = u64::from(ROWS_PER_PAGE);
        let min_row = (page - 1) * rows + 1;
        Self {
            min_row,
            max_row: min_row + rows - 1,
            rows_fetched: ROWS_PER_PAGE,
        }
    }
}

/// Renders the `p_widget_action_mod` value the report widget expects.
impl fmt::Display for RowWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pgR_min_row={}max_rows={}rows_fetched={}",
            self.min_row, self.max_row, self.rows_fetched
        )
    }
}

/// A form-encoded POST that asks the report widget for one page of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPageRequest {
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl NextPageRequest {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Builds a fresh page request for `context.page_number()`, echoing the session
/// tokens verbatim.
pub fn next_page_request(context: &SessionContext) -> NextPageRequest {
    let window = RowWindow::for_page(context.page_number());
    let form = [
        ("p_request", "APXWGT".to_string()),
        ("p_instance", context.instance_id().to_string()),
        ("p_flow_id", context.flow_id().to_string()),
        ("p_flow_step_id", context.flow_step_id().to_string()),
        ("p_widget_num_return", ROWS_PER_PAGE.to_string()),
        ("p_widget_name", "worksheet".to_string()),
        ("p_widget_mod", "ACTION".to_string()),
        ("p_widget_action", "PAGE".to_string()),
        ("p_widget_action_mod", window.to_string()),
        ("x01", context.worksheet_id().to_string()),
        ("x02", context.report_id().to_string()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect();

    NextPageRequest {
        url: NEXT_PAGE_URL.to_string(),
        form,
    }
}
