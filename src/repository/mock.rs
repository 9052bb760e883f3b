//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::application::{Application, ConsiderationStatus};
use crate::domain::document::{Document, NewDocument};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ApplicationListQuery, ApplicationReader, ApplicationWriter, DocumentReader, DocumentWriter,
    SectionSave,
};

mock! {
    pub Repository {}

    impl ApplicationReader for Repository {
        fn get_application(&self, applicant_id: &str) -> RepositoryResult<Option<Application>>;
        fn get_application_by_id(&self, id: i32) -> RepositoryResult<Option<Application>>;
        fn list_applications(
            &self,
            query: ApplicationListQuery,
        ) -> RepositoryResult<(usize, Vec<Application>)>;
    }

    impl ApplicationWriter for Repository {
        fn save_section(
            &self,
            applicant_id: &str,
            save: &SectionSave,
        ) -> RepositoryResult<Application>;
        fn set_consideration(
            &self,
            applicant_id: &str,
            status: ConsiderationStatus,
            message: Option<&str>,
        ) -> RepositoryResult<Application>;
    }

    impl DocumentReader for Repository {
        fn get_document_by_id(&self, id: i32) -> RepositoryResult<Option<Document>>;
        fn list_documents(&self, applicant_id: &str) -> RepositoryResult<Vec<Document>>;
    }

    impl DocumentWriter for Repository {
        fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
    }
}
