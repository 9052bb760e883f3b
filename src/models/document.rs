use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::{Document as DomainDocument, NewDocument as DomainNewDocument};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::documents)]
/// Diesel model for [`crate::domain::document::Document`].
pub struct Document {
    pub id: i32,
    pub applicant_id: String,
    pub file_name: String,
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
/// Insertable form of [`Document`]. `stored_name` is filled in after the
/// insert, once the id is known.
pub struct NewDocument<'a> {
    pub applicant_id: &'a str,
    pub file_name: &'a str,
    pub stored_name: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub created_at: NaiveDateTime,
}

impl From<Document> for DomainDocument {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            applicant_id: document.applicant_id,
            file_name: document.file_name,
            stored_name: document.stored_name,
            content_type: document.content_type,
            size_bytes: document.size_bytes,
            created_at: document.created_at,
        }
    }
}

impl<'a> NewDocument<'a> {
    pub fn from_domain(document: &'a DomainNewDocument, now: NaiveDateTime) -> Self {
        Self {
            applicant_id: document.applicant_id.as_str(),
            file_name: document.file_name.as_str(),
            stored_name: "",
            content_type: document.content_type.as_str(),
            size_bytes: document.size_bytes,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn document_into_domain() {
        let now = Utc::now().naive_utc();
        let row = Document {
            id: 245,
            applicant_id: "u-1".to_string(),
            file_name: "report.pdf".to_string(),
            stored_name: "245_report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 1024,
            created_at: now,
        };
        let domain: DomainDocument = row.into();
        assert_eq!(domain.id, 245);
        assert_eq!(domain.stored_name, "245_report.pdf");
    }
}
