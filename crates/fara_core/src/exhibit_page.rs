use scraper::{ElementRef, Html};

use crate::html::{joined_attr, joined_text, select_all};
use crate::record::ExhibitRecord;

const EXHIBIT_ROWS: &str =
    "table.apexir_WORKSHEET_DATA tr.even, table.apexir_WORKSHEET_DATA tr.odd";

/// A principal's detail page, listing its filed exhibits.
pub struct ExhibitPage {
    document: Html,
}

impl ExhibitPage {
    pub fn new(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
        }
    }

    /// Exhibits in row order. Missing columns come back as empty strings;
    /// [`ExhibitRecord::validate`] decides whether the row is usable.
    pub fn exhibits(&self) -> Vec<ExhibitRecord> {
        select_all(self.document.root_element(), EXHIBIT_ROWS)
            .into_iter()
            .map(exhibit_from_row)
            .collect()
    }
}

fn exhibit_from_row(row: ElementRef<'_>) -> ExhibitRecord {
    ExhibitRecord {
        date_stamped: joined_text(row, r#"td[headers="DATE_STAMPED"]"#),
        document_link: joined_attr(row, r#"td[headers="DOCLINK"] > a"#, "href"),
        registration_number: joined_text(row, r#"td[headers="REGISTRATION_NUMBER"]"#),
        registrant_name: joined_text(row, r#"td[headers="REGISTRANT_NAME"]"#),
        document_type: joined_text(row, r#"td[headers="DOCUMENT_TYPE"]"#),
    }
}
