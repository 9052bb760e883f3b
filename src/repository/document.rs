use chrono::Utc;
use diesel::prelude::*;

use crate::domain::document::{Document, NewDocument, stored_name};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, DocumentReader, DocumentWriter};

impl DocumentReader for DieselRepository {
    fn get_document_by_id(&self, id: i32) -> RepositoryResult<Option<Document>> {
        use crate::models::document::Document as DbDocument;
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let document = documents::table
            .find(id)
            .first::<DbDocument>(&mut conn)
            .optional()?;

        Ok(document.map(Into::into))
    }

    fn list_documents(&self, applicant_id: &str) -> RepositoryResult<Vec<Document>> {
        use crate::models::document::Document as DbDocument;
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let items = documents::table
            .filter(documents::applicant_id.eq(applicant_id))
            .order(documents::id.asc())
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(items)
    }
}

impl DocumentWriter for DieselRepository {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document> {
        use crate::models::document::{Document as DbDocument, NewDocument as DbNewDocument};
        use crate::schema::documents;

        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let now = Utc::now().naive_utc();
            let insertable = DbNewDocument::from_domain(new_document, now);

            let inserted: DbDocument = diesel::insert_into(documents::table)
                .values(&insertable)
                .get_result(conn)?;

            // The storage name embeds the id, which only exists after insert.
            let name = stored_name(inserted.id, &new_document.file_name);
            diesel::update(documents::table.find(inserted.id))
                .set(documents::stored_name.eq(&name))
                .execute(conn)?;

            let updated = documents::table
                .find(inserted.id)
                .first::<DbDocument>(conn)?;
            Ok(updated.into())
        })
    }
}
