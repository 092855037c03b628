//! Principal and exhibit records.
//!
//! A principal starts life as a [`PartialPrincipal`] built from one list-page row.
//! Merging the exhibits found on its detail page promotes it to a
//! [`FullPrincipal`], which is the only form that can become an output
//! [`PrincipalRecord`].

use serde::{Deserialize, Serialize};

use crate::FaraError;

/// Metadata of one filed document listed on a principal's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExhibitRecord {
    pub date_stamped: String,
    pub document_link: String,
    #[serde(rename = "reg_number")]
    pub registration_number: String,
    #[serde(rename = "registrant")]
    pub registrant_name: String,
    pub document_type: String,
}

impl ExhibitRecord {
    /// Every field is required; reports the first blank one in declaration order.
    pub fn validate(&self) -> Result<(), FaraError> {
        let fields = [
            ("date_stamped", &self.date_stamped),
            ("document_link", &self.document_link),
            ("registration_number", &self.registration_number),
            ("registrant_name", &self.registrant_name),
            ("document_type", &self.document_type),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(FaraError::InvalidExhibit { field: *field }),
            None => Ok(()),
        }
    }
}

/// Base attributes of a principal as read from the list page.
///
/// Fields are optional so a record carried through an external crawler keeps the
/// difference between an absent attribute and one present but blank.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrincipalFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "country", default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "reg_number", default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    #[serde(
        rename = "principal_reg_date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub principal_registration_date: Option<String>,
    #[serde(rename = "reg_date", default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
    #[serde(rename = "registrant", default, skip_serializing_if = "Option::is_none")]
    pub registrant_name: Option<String>,
}

impl PrincipalFields {
    /// Presence check over the required attributes, then a non-blank check over
    /// the four identifying ones.
    pub fn validate(&self) -> Result<(), FaraError> {
        let required = [
            ("url", &self.url),
            ("country", &self.country_name),
            ("state", &self.state),
            ("address", &self.address),
            ("registration_number", &self.registration_number),
            ("principal_name", &self.principal_name),
            ("principal_registration_date", &self.principal_registration_date),
            ("registration_date", &self.registration_date),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_none()) {
            return Err(FaraError::missing_field(*field));
        }

        let non_blank = [
            ("principal_name", &self.principal_name),
            ("registration_number", &self.registration_number),
            ("country", &self.country_name),
            ("principal_registration_date", &self.principal_registration_date),
        ];
        let blank = non_blank
            .iter()
            .find(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()));
        match blank {
            Some((field, _)) => Err(FaraError::blank_field(*field)),
            None => Ok(()),
        }
    }
}

/// Where a principal stands with respect to its detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhibitStatus {
    NotFetched,
    FetchedEmpty,
    FetchedNonEmpty,
}

/// A principal populated from the list page only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialPrincipal {
    fields: PrincipalFields,
}

impl PartialPrincipal {
    pub fn new(fields: PrincipalFields) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &PrincipalFields {
        &self.fields
    }

    pub fn url(&self) -> Option<&str> {
        self.fields.url.as_deref()
    }

    pub fn validate(&self) -> Result<(), FaraError> {
        self.fields.validate()
    }

    /// The list-page mapping, without any `exhibit` key.
    pub fn partial_record(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.fields)
    }

    /// Promotes the record once its detail page has been read. An empty
    /// `exhibits` still yields a full record.
    pub fn merge(self, exhibits: Vec<ExhibitRecord>) -> FullPrincipal {
        FullPrincipal {
            fields: self.fields,
            exhibits,
        }
    }
}

/// A principal whose detail page has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullPrincipal {
    fields: PrincipalFields,
    exhibits: Vec<ExhibitRecord>,
}

impl FullPrincipal {
    pub fn fields(&self) -> &PrincipalFields {
        &self.fields
    }

    /// Exhibits in detail-page order; duplicates are kept.
    pub fn exhibits(&self) -> &[ExhibitRecord] {
        &self.exhibits
    }

    pub fn push_exhibit(&mut self, exhibit: ExhibitRecord) {
        self.exhibits.push(exhibit);
    }

    pub fn exhibit_status(&self) -> ExhibitStatus {
        if self.exhibits.is_empty() {
            ExhibitStatus::FetchedEmpty
        } else {
            ExhibitStatus::FetchedNonEmpty
        }
    }

    /// Validates the base attributes and every exhibit.
    pub fn validate(&self) -> Result<(), FaraError> {
        self.fields.validate()?;
        self.exhibits.iter().try_for_each(ExhibitRecord::validate)
    }

    /// Validates and converts into the output mapping.
    pub fn into_record(self) -> Result<PrincipalRecord, FaraError> {
        self.validate()?;
        let PrincipalFields {
            url,
            country_name,
            state,
            address,
            registration_number,
            principal_name,
            principal_registration_date,
            registration_date,
            registrant_name,
        } = self.fields;

        // Presence was checked by `validate`.
        Ok(PrincipalRecord {
            url: url.unwrap_or_default(),
            country: country_name.unwrap_or_default(),
            state: state.unwrap_or_default(),
            address: address.unwrap_or_default(),
            reg_number: registration_number.unwrap_or_default(),
            principal_name: principal_name.unwrap_or_default(),
            principal_reg_date: principal_registration_date.unwrap_or_default(),
            reg_date: registration_date.unwrap_or_default(),
            registrant: registrant_name,
            exhibit: self.exhibits,
        })
    }
}

/// A principal at either stage of assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Partial(PartialPrincipal),
    Full(FullPrincipal),
}

impl Principal {
    pub fn is_partial(&self) -> bool {
        matches!(self, Principal::Partial(_))
    }

    pub fn fields(&self) -> &PrincipalFields {
        match self {
            Principal::Partial(partial) => partial.fields(),
            Principal::Full(full) => full.fields(),
        }
    }

    pub fn exhibit_status(&self) -> ExhibitStatus {
        match self {
            Principal::Partial(_) => ExhibitStatus::NotFetched,
            Principal::Full(full) => full.exhibit_status(),
        }
    }

    /// Appends one exhibit, promoting a partial record to a full one.
    pub fn add_exhibit(self, exhibit: ExhibitRecord) -> Self {
        let mut full = self.into_full();
        full.push_exhibit(exhibit);
        Principal::Full(full)
    }

    /// Appends a batch of exhibits. Promotes the record even when the batch is empty.
    pub fn add_exhibits(self, exhibits: impl IntoIterator<Item = ExhibitRecord>) -> Self {
        let mut full = self.into_full();
        full.exhibits.extend(exhibits);
        Principal::Full(full)
    }

    pub fn validate_partial(&self) -> Result<(), FaraError> {
        self.fields().validate()
    }

    /// Partial validation plus the presence of the exhibits collection.
    pub fn validate_full(&self) -> Result<(), FaraError> {
        self.validate_partial()?;
        match self {
            Principal::Partial(_) => Err(FaraError::missing_field("exhibit")),
            Principal::Full(_) => Ok(()),
        }
    }

    fn into_full(self) -> FullPrincipal {
        match self {
            Principal::Partial(partial) => partial.merge(Vec::new()),
            Principal::Full(full) => full,
        }
    }
}

impl From<PartialPrincipal> for Principal {
    fn from(partial: PartialPrincipal) -> Self {
        Principal::Partial(partial)
    }
}

impl From<FullPrincipal> for Principal {
    fn from(full: FullPrincipal) -> Self {
        Principal::Full(full)
    }
}

/// The assembled principal handed to an output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    pub url: String,
    pub country: String,
    pub state: String,
    pub address: String,
    pub reg_number: String,
    pub principal_name: String,
    pub principal_reg_date: String,
    pub reg_date: String,
    pub registrant: Option<String>,
    pub exhibit: Vec<ExhibitRecord>,
}

impl PrincipalRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
