use serde_json::{Map, Value};

use crate::db::{DbConnection, DbPool};
use crate::domain::application::{Application, ApplicationStatus, ConsiderationStatus};
use crate::domain::document::{Document, NewDocument};
use crate::domain::section::Section;
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod application;
pub mod document;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
    pub consideration: Option<ConsiderationStatus>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl Default for ApplicationListQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationListQuery {
    pub fn new() -> Self {
        Self {
            status: None,
            consideration: None,
            search: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn consideration(mut self, status: ConsiderationStatus) -> Self {
        self.consideration = Some(status);
        self
    }

    /// Case-insensitive match against the stored company name.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// One accepted section save: the payload (already translated to data keys),
/// the wizard bookkeeping the service computed, and the revision the caller
/// saw. The write is refused if the stored revision has moved past it.
#[derive(Debug, Clone)]
pub struct SectionSave {
    pub section: Section,
    pub payload: Map<String, Value>,
    pub expected_revision: i64,
    pub next_step: u8,
    pub submit: bool,
}

pub trait ApplicationReader {
    fn get_application(&self, applicant_id: &str) -> RepositoryResult<Option<Application>>;
    fn get_application_by_id(&self, id: i32) -> RepositoryResult<Option<Application>>;
    fn list_applications(
        &self,
        query: ApplicationListQuery,
    ) -> RepositoryResult<(usize, Vec<Application>)>;
}

pub trait ApplicationWriter {
    /// Merges a section payload into the stored application (creating the row
    /// on first save) and advances the wizard bookkeeping.
    fn save_section(&self, applicant_id: &str, save: &SectionSave)
    -> RepositoryResult<Application>;
    fn set_consideration(
        &self,
        applicant_id: &str,
        status: ConsiderationStatus,
        message: Option<&str>,
    ) -> RepositoryResult<Application>;
}

pub trait DocumentReader {
    fn get_document_by_id(&self, id: i32) -> RepositoryResult<Option<Document>>;
    fn list_documents(&self, applicant_id: &str) -> RepositoryResult<Vec<Document>>;
}

pub trait DocumentWriter {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
}

/// Diesel-backed implementation of every repository trait, shared across
/// handlers through the connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn conn(&self) -> Result<DbConnection, RepositoryError> {
        self.pool.get().map_err(Into::into)
    }
}
