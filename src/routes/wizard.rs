use std::path::Path;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use serde_json::{Map, Value, json};
use tera::Tera;
use validator::Validate;

use crate::domain::document::DocumentUpload;
use crate::domain::section::Section;
use crate::domain::types::ApplicantId;
use crate::dto::wizard::{UploadResponse, WizardPageData};
use crate::forms::FormError;
use crate::forms::applicability::ApplicabilityForm;
use crate::forms::bank::BankRelationshipForm;
use crate::forms::company::CompanyDetailsForm;
use crate::forms::consideration::SpecialConsiderationForm;
use crate::forms::data_protection::DataProtectionForm;
use crate::forms::declaration::DeclarationForm;
use crate::forms::documents::RequiredDocumentsForm;
use crate::forms::financial::FinancialThresholdForm;
use crate::forms::regulatory::RegulatoryComplianceForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, wizard as wizard_service};
use crate::store::DraftStore;

fn step_url(applicant_id: &ApplicantId, step: u8) -> String {
    format!("/apply/{applicant_id}/step/{step}")
}

fn parse_applicant(raw: String) -> Result<ApplicantId, HttpResponse> {
    ApplicantId::new(raw).map_err(|_| HttpResponse::BadRequest().finish())
}

/// Shared submit tail of every section orchestrator: call the save
/// operation, toast the outcome, and advance (or hold) the step.
fn finish_section_save(
    repo: &DieselRepository,
    store: &DraftStore,
    applicant_id: &ApplicantId,
    section: Section,
    payload: Result<Map<String, Value>, FormError>,
) -> HttpResponse {
    let payload = match payload {
        Ok(payload) => payload,
        Err(err) => {
            log::error!("Failed to validate {section} form: {err}");
            FlashMessage::error(format!("Please check the form: {err}")).send();
            return redirect(&step_url(applicant_id, section.step()));
        }
    };

    match wizard_service::save_upload_details(repo, store, applicant_id, section, payload) {
        Ok(outcome) if outcome.submitted => {
            FlashMessage::success("Application submitted for review.").send();
            redirect(&format!("/apply/{applicant_id}/complete"))
        }
        Ok(outcome) => {
            FlashMessage::success(format!("{section} saved.")).send();
            redirect(&step_url(applicant_id, outcome.next_step))
        }
        Err(ServiceError::SpecialConsiderationRequired) => {
            // Step 1 only: a "no" answer opens the side dialog instead of
            // advancing.
            FlashMessage::warning(
                "One of your answers needs special consideration before you can proceed.",
            )
            .send();
            redirect(&format!("{}?consideration=open", step_url(applicant_id, 1)))
        }
        Err(ServiceError::UploadsPending(count)) => {
            FlashMessage::warning(format!("{count} upload(s) still in progress.")).send();
            redirect(&step_url(applicant_id, section.step()))
        }
        Err(err) => {
            log::error!("Failed to save {section}: {err}");
            FlashMessage::error(format!("Could not save {section}.")).send();
            redirect(&step_url(applicant_id, section.step()))
        }
    }
}

#[get("/apply/{applicant_id}/step/{step}")]
pub async fn show_step(
    path: web::Path<(String, u8)>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (applicant_id, step) = path.into_inner();
    let applicant_id = match parse_applicant(applicant_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(section) = Section::from_step(step) else {
        FlashMessage::error("Unknown application step.").send();
        return redirect(&step_url(&applicant_id, Section::FIRST_STEP));
    };

    // Hydrate from storage on the wizard's first visit of this session.
    let needs_hydration = store.with_draft(applicant_id.as_str(), |draft| draft.user_id.is_none());
    if needs_hydration
        && let Err(err) =
            wizard_service::get_upload_details(repo.get_ref(), &store, &applicant_id)
    {
        log::error!("Failed to hydrate draft for {applicant_id}: {err}");
        FlashMessage::error("Could not load your saved application.").send();
    }

    let page = WizardPageData::new(section, store.snapshot(applicant_id.as_str()));
    let mut context = base_context(&flash_messages, "apply");
    context.insert("applicant_id", applicant_id.as_str());
    context.insert("page", &page);

    render_template(
        &tera,
        &format!("wizard/step{}.html", section.step()),
        &context,
    )
}

#[get("/apply/{applicant_id}/complete")]
pub async fn show_complete(
    path: web::Path<String>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let mut context = base_context(&flash_messages, "apply");
    context.insert("applicant_id", applicant_id.as_str());
    render_template(&tera, "wizard/complete.html", &context)
}

#[derive(MultipartForm)]
pub struct UploadDocumentForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

#[post("/apply/{applicant_id}/upload")]
pub async fn upload_document(
    path: web::Path<String>,
    MultipartForm(form): MultipartForm<UploadDocumentForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let file_name = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "document".to_string());
    let content_type = form
        .file
        .content_type
        .as_ref()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let bytes = match std::fs::read(form.file.file.path()) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("Failed to read uploaded temp file: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match wizard_service::upload_document(
        repo.get_ref(),
        &store,
        Path::new(&server_config.uploads_dir),
        &applicant_id,
        DocumentUpload {
            file_name,
            content_type,
            bytes,
        },
    ) {
        Ok(document) => HttpResponse::Ok().json(UploadResponse {
            id: document.id,
            stored_name: document.stored_name,
        }),
        Err(err) => {
            log::error!("Failed to upload document for {applicant_id}: {err}");
            HttpResponse::UnprocessableEntity().json(json!({"error": err.to_string()}))
        }
    }
}

#[post("/apply/{applicant_id}/section/applicability")]
pub async fn save_applicability(
    path: web::Path<String>,
    web::Form(form): web::Form<ApplicabilityForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = form.validate().map_err(FormError::from).map(|_| form.payload());
    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::Applicability,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/company-details")]
pub async fn save_company_details(
    path: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Repeated table fields (shareholders, UBOs, directors) need the
    // html-form deserializer rather than the default urlencoded one.
    let payload = serde_html_form::from_bytes::<CompanyDetailsForm>(&body)
        .map_err(|err| FormError::Invalid(err.to_string()))
        .and_then(|form| {
            form.validate()?;
            form.validate_requirements()?;
            form.payload()
        });

    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::CompanyDetails,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/bank-relationship")]
pub async fn save_bank_relationship(
    path: web::Path<String>,
    web::Form(form): web::Form<BankRelationshipForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = form
        .validate()
        .map_err(FormError::from)
        .and_then(|_| form.validate_requirements())
        .map(|_| form.payload());
    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::BankRelationReq,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/financial-thresholds")]
pub async fn save_financial_thresholds(
    path: web::Path<String>,
    web::Form(form): web::Form<FinancialThresholdForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = form
        .validate()
        .map_err(FormError::from)
        .and_then(|_| form.validate_requirements())
        .map(|_| form.payload());
    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::FinancialThreshold,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/regulatory-compliance")]
pub async fn save_regulatory_compliance(
    path: web::Path<String>,
    web::Form(form): web::Form<RegulatoryComplianceForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = form
        .validate()
        .map_err(FormError::from)
        .and_then(|_| form.validate_requirements())
        .map(|_| form.payload());
    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::RegulatoryCompliance,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/required-documents")]
pub async fn save_required_documents(
    path: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = serde_html_form::from_bytes::<RequiredDocumentsForm>(&body)
        .map_err(|err| FormError::Invalid(err.to_string()))
        .and_then(|form| {
            form.validate_requirements()?;
            Ok(form.payload())
        });

    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::RequiredDocs,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/data-protection")]
pub async fn save_data_protection(
    path: web::Path<String>,
    web::Form(form): web::Form<DataProtectionForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = form.validate_requirements().map(|_| form.payload());
    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::DataProtection,
        payload,
    )
}

#[post("/apply/{applicant_id}/section/declaration")]
pub async fn save_declaration(
    path: web::Path<String>,
    web::Form(form): web::Form<DeclarationForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let payload = form
        .validate()
        .map_err(FormError::from)
        .and_then(|_| form.validate_requirements(Utc::now().date_naive()))
        .map(|_| form.payload());
    finish_section_save(
        repo.get_ref(),
        &store,
        &applicant_id,
        Section::DeclarationConsent,
        payload,
    )
}

#[post("/apply/{applicant_id}/special-consideration")]
pub async fn submit_special_consideration(
    path: web::Path<String>,
    web::Form(form): web::Form<SpecialConsiderationForm>,
    repo: web::Data<DieselRepository>,
    store: web::Data<DraftStore>,
) -> impl Responder {
    let applicant_id = match parse_applicant(path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };

    if let Err(err) = form.validate() {
        log::error!("Failed to validate consideration form: {err}");
        FlashMessage::error("Please describe why an exception should apply.").send();
        return redirect(&step_url(&applicant_id, 1));
    }
    let message = match form.consideration_message() {
        Ok(message) => message,
        Err(err) => {
            FlashMessage::error(format!("Please check the message: {err}")).send();
            return redirect(&step_url(&applicant_id, 1));
        }
    };

    match wizard_service::request_special_consideration(
        repo.get_ref(),
        &store,
        &applicant_id,
        form.payload(),
        message,
    ) {
        Ok(_) => {
            FlashMessage::success(
                "Your request was submitted; an administrator will review it shortly.",
            )
            .send();
        }
        Err(err) => {
            log::error!("Failed to submit consideration request for {applicant_id}: {err}");
            FlashMessage::error("Could not submit your request.").send();
        }
    }
    redirect(&step_url(&applicant_id, 1))
}
