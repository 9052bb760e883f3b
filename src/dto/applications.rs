//! DTOs shaped for the admin review templates.

use serde::Deserialize;

use crate::domain::application::Application;
use crate::domain::document::Document;
use crate::pagination::Paginated;

/// Query parameters accepted by the applications listing.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
}

/// Aggregated data required to render the applications listing.
pub struct ApplicationsPageData {
    pub applications: Paginated<Application>,
    pub search_query: Option<String>,
}

/// Aggregated data required to render one application's review page.
pub struct ApplicationPageData {
    pub application: Application,
    pub documents: Vec<Document>,
}
