use std::path::Path;

use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{ApplicationId, DocumentId};
use crate::dto::applications::ApplicationsQuery;
use crate::forms::consideration::ConsiderationDecisionForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, applications as applications_service};

#[get("/applications")]
pub async fn applications(
    params: web::Query<ApplicationsQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let page = match applications_service::load_applications_page(
        repo.get_ref(),
        params.into_inner(),
    ) {
        Ok(page) => page,
        Err(err) => {
            log::error!("Failed to load applications: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, "applications");
    context.insert("applications", &page.applications);
    if let Some(search_query) = &page.search_query {
        context.insert("search_query", search_query);
    }

    render_template(&tera, "applications/index.html", &context)
}

#[get("/applications/{application_id}")]
pub async fn show_application(
    application_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(application_id) = ApplicationId::try_from(application_id.into_inner()) else {
        return HttpResponse::BadRequest().finish();
    };

    let page = match applications_service::load_application_page(repo.get_ref(), application_id) {
        Ok(page) => page,
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Application not found.").send();
            return redirect("/applications");
        }
        Err(err) => {
            log::error!("Failed to load application {application_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, "applications");
    context.insert("application", &page.application);
    context.insert("documents", &page.documents);

    render_template(&tera, "applications/show.html", &context)
}

#[get("/documents/{document_id}")]
pub async fn download_document(
    req: HttpRequest,
    document_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Ok(document_id) = DocumentId::try_from(document_id.into_inner()) else {
        return HttpResponse::BadRequest().finish();
    };

    let document = match applications_service::load_document(repo.get_ref(), document_id) {
        Ok(document) => document,
        Err(ServiceError::NotFound) => return HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to load document {document_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let path = Path::new(&server_config.uploads_dir).join(&document.stored_name);
    match actix_files::NamedFile::open(path) {
        Ok(file) => file.into_response(&req),
        Err(err) => {
            log::error!("Failed to open stored document {}: {err}", document.stored_name);
            HttpResponse::NotFound().finish()
        }
    }
}

#[post("/applications/{application_id}/consideration")]
pub async fn decide_consideration(
    application_id: web::Path<i32>,
    web::Form(form): web::Form<ConsiderationDecisionForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let raw_id = application_id.into_inner();
    let Ok(application_id) = ApplicationId::try_from(raw_id) else {
        return HttpResponse::BadRequest().finish();
    };

    match applications_service::decide_consideration(repo.get_ref(), application_id, form.approve())
    {
        Ok(_) => {
            let verdict = if form.approve() { "approved" } else { "rejected" };
            FlashMessage::success(format!("Special consideration {verdict}.")).send();
        }
        Err(err) => {
            log::error!("Failed to decide consideration: {err}");
            FlashMessage::error("Could not update the consideration request.").send();
        }
    }

    redirect(&format!("/applications/{raw_id}"))
}
