//! Admin use-cases: listing applications, reviewing one, serving its
//! documents, and deciding exception requests.

use crate::domain::application::{Application, ConsiderationStatus};
use crate::domain::document::Document;
use crate::domain::types::{ApplicationId, DocumentId};
use crate::dto::applications::{ApplicationPageData, ApplicationsPageData, ApplicationsQuery};
use crate::pagination::Paginated;
use crate::repository::{ApplicationListQuery, ApplicationReader, ApplicationWriter, DocumentReader};
use crate::services::{ServiceError, ServiceResult};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Loads the paginated applications list for the admin dashboard.
pub fn load_applications_page<R>(
    repo: &R,
    query: ApplicationsQuery,
) -> ServiceResult<ApplicationsPageData>
where
    R: ApplicationReader + ?Sized,
{
    let page = query.page.unwrap_or(1);
    let search_query = query
        .q
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let mut list_query = ApplicationListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let (total, applications) = repo.list_applications(list_query).map_err(|err| {
        log::error!("Failed to list applications: {err}");
        err
    })?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    let applications = Paginated::new(applications, page, total_pages);

    Ok(ApplicationsPageData {
        applications,
        search_query,
    })
}

/// Loads one application with its uploaded documents for the review page.
pub fn load_application_page<R>(
    repo: &R,
    application_id: ApplicationId,
) -> ServiceResult<ApplicationPageData>
where
    R: ApplicationReader + DocumentReader + ?Sized,
{
    let application = repo
        .get_application_by_id(application_id.get())?
        .ok_or(ServiceError::NotFound)?;

    let documents = repo
        .list_documents(&application.applicant_id)
        .map_err(|err| {
            log::error!("Failed to list documents: {err}");
            err
        })?;

    Ok(ApplicationPageData {
        application,
        documents,
    })
}

/// Looks up the metadata of one uploaded document, e.g. for download.
pub fn load_document<R>(repo: &R, document_id: DocumentId) -> ServiceResult<Document>
where
    R: DocumentReader + ?Sized,
{
    repo.get_document_by_id(document_id.get())?
        .ok_or(ServiceError::NotFound)
}

/// Approves or rejects a pending special-consideration request. Approval is
/// what unblocks step 1 for an applicant with a "no" eligibility answer.
pub fn decide_consideration<R>(
    repo: &R,
    application_id: ApplicationId,
    approve: bool,
) -> ServiceResult<Application>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    let application = repo
        .get_application_by_id(application_id.get())?
        .ok_or(ServiceError::NotFound)?;

    if application.special_consideration.status == ConsiderationStatus::None {
        return Err(ServiceError::Invalid(
            "no consideration request on file".to_string(),
        ));
    }

    let status = if approve {
        ConsiderationStatus::Approved
    } else {
        ConsiderationStatus::Rejected
    };

    repo.set_consideration(
        &application.applicant_id,
        status,
        application.special_consideration.message.as_deref(),
    )
    .map_err(|err| {
        log::error!("Failed to update consideration status: {err}");
        ServiceError::from(err)
    })
}
