use serde::{Deserialize, Serialize};

use crate::FaraError;

/// First, un-paginated load of the active principals list.
pub const ENTRY_URL: &str =
    "https://efile.fara.gov/pls/apex/f?p=171:130:0::NO:RP,130:P130_DATERANGE:N";

/// Every page transition after the entry page is a POST to this endpoint.
pub const NEXT_PAGE_URL: &str = "https://efile.fara.gov/pls/apex/wwv_flow.show";

/// Relative principal links on the list page are resolved against this base.
pub const DETAIL_BASE_URL: &str = "https://efile.fara.gov/pls/apex/";

/// Server-issued tokens that authenticate page requests within one browsing session,
/// plus the client-tracked page number.
///
/// The five tokens are non-empty and never change once obtained; only `page_number`
/// moves, through [`SessionContext::advanced`]. Deserialization applies the same
/// token check as [`SessionContext::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CarriedContext")]
pub struct SessionContext {
    instance_id: String,
    flow_id: String,
    flow_step_id: String,
    worksheet_id: String,
    report_id: String,
    page_number: u32,
}

impl SessionContext {
    /// Builds the context for page 1. Fails on the first empty token.
    pub fn new(
        instance_id: impl Into<String>,
        flow_id: impl Into<String>,
        flow_step_id: impl Into<String>,
        worksheet_id: impl Into<String>,
        report_id: impl Into<String>,
    ) -> Result<Self, FaraError> {
        let context = Self {
            instance_id: instance_id.into(),
            flow_id: flow_id.into(),
            flow_step_id: flow_step_id.into(),
            worksheet_id: worksheet_id.into(),
            report_id: report_id.into(),
            page_number: 1,
        };
        context.check_tokens()?;
        Ok(context)
    }

    /// Same context positioned at `page_number` (clamped to 1).
    pub fn at_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number.max(1);
        self
    }

    /// Copy of this context for the following page.
    pub fn advanced(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn flow_step_id(&self) -> &str {
        &self.flow_step_id
    }

    pub fn worksheet_id(&self) -> &str {
        &self.worksheet_id
    }

    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Fails with [`FaraError::SessionTokenMissing`] naming the first blank token.
    pub fn check_tokens(&self) -> Result<(), FaraError> {
        let tokens = [
            (SessionToken::Instance, &self.instance_id),
            (SessionToken::Flow, &self.flow_id),
            (SessionToken::FlowStep, &self.flow_step_id),
            (SessionToken::Worksheet, &self.worksheet_id),
            (SessionToken::Report, &self.report_id),
        ];
        match tokens.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((token, _)) => Err(FaraError::SessionTokenMissing {
                token: token.wire_name(),
            }),
            None => Ok(()),
        }
    }
}

/// Wire shape of a context carried as request metadata, before its tokens are checked.
#[derive(Deserialize)]
struct CarriedContext {
    instance_id: String,
    flow_id: String,
    flow_step_id: String,
    worksheet_id: String,
    report_id: String,
    page_number: u32,
}

impl TryFrom<CarriedContext> for SessionContext {
    type Error = FaraError;

    fn try_from(carried: CarriedContext) -> Result<Self, Self::Error> {
        Ok(SessionContext::new(
            carried.instance_id,
            carried.flow_id,
            carried.flow_step_id,
            carried.worksheet_id,
            carried.report_id,
        )?
        .at_page(carried.page_number))
    }
}

/// The hidden inputs that carry session tokens on the entry page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionToken {
    Instance,
    Flow,
    FlowStep,
    Worksheet,
    Report,
}

impl SessionToken {
    pub const ALL: [SessionToken; 5] = [
        SessionToken::Instance,
        SessionToken::Flow,
        SessionToken::FlowStep,
        SessionToken::Worksheet,
        SessionToken::Report,
    ];

    /// Attribute value identifying the hidden input in the document.
    pub fn wire_name(self) -> &'static str {
        match self {
            SessionToken::Instance => "p_instance",
            SessionToken::Flow => "p_flow_id",
            SessionToken::FlowStep => "p_flow_step_id",
            SessionToken::Worksheet => "apexir_WORKSHEET_ID",
            SessionToken::Report => "apexir_REPORT_ID",
        }
    }

    /// CSS selector for the hidden input: session inputs are matched by `name`,
    /// report-region inputs by `id`.
    pub(crate) fn selector(self) -> String {
        match self {
            SessionToken::Instance | SessionToken::Flow | SessionToken::FlowStep => {
                format!(r#"input[name="{}"]"#, self.wire_name())
            }
            SessionToken::Worksheet | SessionToken::Report => {
                format!(r#"input[id="{}"]"#, self.wire_name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SessionContext {
        SessionContext::new("9488617858409", "171", "130", "80340213897823017", "80341508791823021")
            .unwrap()
    }

    #[test]
    fn new_context_starts_on_first_page() {
        assert_eq!(context().page_number(), 1);
    }

    #[test]
    fn advanced_only_moves_page_number() {
        let first = context();
        let second = first.advanced();
        assert_eq!(second.page_number(), 2);
        assert_eq!(second.instance_id(), first.instance_id());
        assert_eq!(second.report_id(), first.report_id());
        assert_eq!(first.page_number(), 1);
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = SessionContext::new("1", "171", "", "2", "3").unwrap_err();
        assert_eq!(
            err,
            FaraError::SessionTokenMissing {
                token: "p_flow_step_id"
            }
        );
    }

    #[test]
    fn carried_context_round_trips_through_json() {
        let carried = context().at_page(7);
        let json = serde_json::to_string(&carried).unwrap();
        let restored: SessionContext = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, carried);
    }

    #[test]
    fn carried_context_with_blank_token_is_rejected() {
        let json = r#"{
            "instance_id": "",
            "flow_id": "171",
            "flow_step_id": "130",
            "worksheet_id": "80340213897823017",
            "report_id": "80341508791823021",
            "page_number": 2
        }"#;
        let err = serde_json::from_str::<SessionContext>(json).unwrap_err();
        assert!(err.to_string().contains("p_instance"), "{err}");
    }

    #[test]
    fn page_zero_is_clamped() {
        assert_eq!(context().at_page(0).page_number(), 1);
    }
}
