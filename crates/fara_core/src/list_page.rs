//! Parsing of the paginated active-principals list.
//!
//! Principals are laid out in one report table where each country opens a group
//! with a header cell (`th id="BREAK_COUNTRY_NAME_<n>"`). Principal rows are not
//! nested under their header; instead each row's link cell carries
//! `headers="LINK BREAK_COUNTRY_NAME_<n>"`. The shared `<n>` is extracted into a
//! typed key on both sides and the two collections are joined on it.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crawl_logging::{crawl_debug, crawl_warn};
use scraper::{ElementRef, Html};
use url::Url;

use crate::html::{joined_attr, joined_text, select_all, trailing_index};
use crate::pagination::{next_page_request, NextPageRequest};
use crate::record::{PartialPrincipal, PrincipalFields};
use crate::session::{SessionContext, SessionToken, DETAIL_BASE_URL, ENTRY_URL};
use crate::FaraError;

/// A country group header found on a list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryHeader {
    pub index: u32,
    pub name: String,
}

/// One principal row, keyed by the country group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRow {
    pub country_index: u32,
    pub url: String,
    pub principal_name: String,
    pub principal_registration_date: String,
    pub address: String,
    pub state: String,
    pub registrant_name: String,
    pub registration_number: String,
    pub registration_date: String,
}

impl PrincipalRow {
    fn into_partial(self, country_name: &str) -> PartialPrincipal {
        PartialPrincipal::new(PrincipalFields {
            url: Some(self.url),
            country_name: Some(country_name.to_string()),
            state: Some(self.state),
            address: Some(self.address),
            registration_number: Some(self.registration_number),
            principal_name: Some(self.principal_name),
            principal_registration_date: Some(self.principal_registration_date),
            registration_date: Some(self.registration_date),
            registrant_name: Some(self.registrant_name),
        })
    }
}

/// One fetched list page.
pub struct ListPage {
    url: String,
    document: Html,
    context: OnceCell<SessionContext>,
}

impl ListPage {
    /// `context` is the session context carried from earlier pages; pass `None` for
    /// the entry page, whose hidden inputs are then read on demand.
    pub fn new(url: impl Into<String>, body: &str, context: Option<SessionContext>) -> Self {
        let cell = OnceCell::new();
        if let Some(context) = context {
            let _ = cell.set(context);
        }
        Self {
            url: url.into(),
            document: Html::parse_document(body),
            context: cell,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_entry_page(&self) -> bool {
        self.url == ENTRY_URL
    }

    /// The session context for this page. Derived from the document at most once;
    /// a context supplied at construction is returned unchanged.
    pub fn session_context(&self) -> Result<&SessionContext, FaraError> {
        if let Some(context) = self.context.get() {
            return Ok(context);
        }
        let parsed = self.parse_session_context()?;
        Ok(self.context.get_or_init(|| parsed))
    }

    fn parse_session_context(&self) -> Result<SessionContext, FaraError> {
        let [instance, flow, flow_step, worksheet, report] =
            SessionToken::ALL.map(|token| self.hidden_value(token));
        SessionContext::new(instance?, flow?, flow_step?, worksheet?, report?)
    }

    fn hidden_value(&self, token: SessionToken) -> Result<String, FaraError> {
        select_all(self.document.root_element(), &token.selector())
            .into_iter()
            .find_map(|input| input.value().attr("value"))
            .map(str::to_string)
            .ok_or(FaraError::SessionTokenMissing {
                token: token.wire_name(),
            })
    }

    /// Country group headers in document order.
    pub fn country_headers(&self) -> Vec<CountryHeader> {
        select_all(
            self.document.root_element(),
            r#"th[id^="BREAK_COUNTRY_NAME"]"#,
        )
        .into_iter()
        .filter_map(|header| {
            let id = header.value().attr("id").unwrap_or_default();
            let Some(index) = trailing_index(id) else {
                crawl_warn!("Skipping country header with unindexed id {id:?}");
                return None;
            };
            Some(CountryHeader {
                index,
                name: joined_text(header, r#"span[class="apex_break_headers"]"#),
            })
        })
        .collect()
    }

    /// Principal rows in document order, before they are joined with their country.
    pub fn principal_rows(&self) -> Result<Vec<PrincipalRow>, FaraError> {
        let base = Url::parse(DETAIL_BASE_URL).map_err(|err| FaraError::InvalidLink {
            href: DETAIL_BASE_URL.to_string(),
            message: err.to_string(),
        })?;

        let mut rows = Vec::new();
        for cell in select_all(
            self.document.root_element(),
            r#"td[headers^="LINK BREAK_COUNTRY_NAME"]"#,
        ) {
            let headers = cell.value().attr("headers").unwrap_or_default();
            let Some(country_index) = trailing_index(headers) else {
                crawl_warn!("Skipping principal row with unindexed headers {headers:?}");
                continue;
            };
            let Some(row) = cell.parent().and_then(ElementRef::wrap) else {
                continue;
            };

            let href = joined_attr(cell, "a", "href");
            let url = base
                .join(&href)
                .map_err(|err| FaraError::InvalidLink {
                    href: href.clone(),
                    message: err.to_string(),
                })?
                .to_string();

            rows.push(PrincipalRow {
                country_index,
                url,
                principal_name: column(row, "FP_NAME"),
                principal_registration_date: column(row, "FP_REG_DATE"),
                address: column(row, "ADDRESS_1"),
                state: column(row, "STATE"),
                registrant_name: column(row, "REGISTRANT_NAME"),
                registration_number: column(row, "REG_NUMBER"),
                registration_date: column(row, "REG_DATE"),
            });
        }
        Ok(rows)
    }

    /// Joins principal rows with the country header sharing their index.
    ///
    /// Rows without a matching header are dropped. An index claimed by more than
    /// one header is reported as [`FaraError::AmbiguousCountry`].
    pub fn partial_principals(&self) -> Result<Vec<PartialPrincipal>, FaraError> {
        let mut countries: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for header in self.country_headers() {
            countries.entry(header.index).or_default().push(header.name);
        }

        let mut principals = Vec::new();
        for row in self.principal_rows()? {
            match countries.get(&row.country_index).map(Vec::as_slice) {
                Some([name]) => principals.push(row.into_partial(name)),
                Some(names) if names.len() > 1 => {
                    return Err(FaraError::AmbiguousCountry {
                        index: row.country_index,
                        names: names.to_vec(),
                    });
                }
                _ => {
                    crawl_warn!(
                        "Dropping principal {:?}: no country header with index {}",
                        row.principal_name,
                        row.country_index
                    );
                }
            }
        }

        crawl_debug!(
            "List page {} yielded {} partial principals",
            self.url,
            principals.len()
        );
        Ok(principals)
    }

    /// Request for the row window of `context.page_number()`. Fails with
    /// [`FaraError::PaginationEnded`] once this page holds no principals.
    pub fn next_page_request(
        &self,
        context: &SessionContext,
    ) -> Result<NextPageRequest, FaraError> {
        if self.partial_principals()?.is_empty() {
            return Err(FaraError::PaginationEnded {
                page: context.page_number(),
            });
        }
        Ok(next_page_request(context))
    }
}

fn column(row: ElementRef<'_>, header_prefix: &str) -> String {
    joined_text(row, &format!(r#"td[headers^="{header_prefix}"]"#))
}
