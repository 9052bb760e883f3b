//! Use-cases of the application wizard: hydrating the draft, saving section
//! payloads, uploading documents, and the special-consideration branch.
//!
//! All functions are generic over the repository traits and free of any web
//! framework types, so they are exercised directly by unit tests.

use std::path::Path;

use serde_json::{Map, Value, json};

use crate::domain::application::{Application, ConsiderationStatus};
use crate::domain::document::{Document, DocumentUpload, NewDocument};
use crate::domain::draft::{ApplicationDraft, DraftAction, ErrorSlot, payload_to_data_keys};
use crate::domain::normalizer::normalize_payload;
use crate::domain::requirements::special_consideration_required;
use crate::domain::section::{APPLICATION_KEY, Section};
use crate::domain::types::{ApplicantId, ConsiderationMessage};
use crate::repository::{ApplicationReader, ApplicationWriter, DocumentWriter, SectionSave};
use crate::services::{ServiceError, ServiceResult};
use crate::store::DraftStore;

/// Result of one accepted section save.
#[derive(Debug)]
pub struct SectionOutcome {
    pub application: Application,
    /// Step the wizard presents next (unchanged on the final section).
    pub next_step: u8,
    /// `true` once the final section marked the application submitted.
    pub submitted: bool,
}

/// Fetches the stored application, normalizes any flat legacy fields, and
/// merges the result into the in-memory draft.
///
/// Fetch failures land in the draft's `fetch` error slot and propagate
/// unmodified.
pub fn get_upload_details<R>(
    repo: &R,
    store: &DraftStore,
    applicant_id: &ApplicantId,
) -> ServiceResult<ApplicationDraft>
where
    R: ApplicationReader + ?Sized,
{
    store.with_draft(applicant_id.as_str(), |draft| {
        draft.apply(DraftAction::SetLoading(true));
    });

    let fetched = repo.get_application(applicant_id.as_str()).map_err(|err| {
        log::error!("Failed to fetch application for {applicant_id}: {err}");
        store.with_draft(applicant_id.as_str(), |draft| {
            draft.apply(DraftAction::SetLoading(false));
            draft.apply(DraftAction::SetError(ErrorSlot::Fetch, err.to_string()));
        });
        err
    })?;

    let draft = store.with_draft(applicant_id.as_str(), |draft| {
        draft.apply(DraftAction::SetLoading(false));
        draft.apply(DraftAction::SetError(ErrorSlot::Fetch, String::new()));
        draft.apply(DraftAction::SetUserId(applicant_id.to_string()));

        if let Some(application) = fetched {
            let mut data = application.data.clone();
            normalize_payload(&mut data);
            data.insert(
                APPLICATION_KEY.to_string(),
                Value::Object(application_fields(&application)),
            );

            draft.apply(DraftAction::UpdateFormData(data));
            draft.apply(DraftAction::SetCurrentStep(application.current_step));
            draft.completed_steps = application.completed_steps.clone();
            draft.revision = application.revision;
        }

        draft.clone()
    });

    Ok(draft)
}

/// Persists one section payload and advances the wizard.
///
/// Refused while uploads are pending or another save is in flight; the saving
/// flag is cleared on every exit path. On success the payload is merged into
/// the draft and the step counter moves; on failure the draft keeps its step
/// and values so the applicant can correct and resubmit. Errors propagate
/// unmodified.
pub fn save_upload_details<R>(
    repo: &R,
    store: &DraftStore,
    applicant_id: &ApplicantId,
    section: Section,
    payload: Map<String, Value>,
) -> ServiceResult<SectionOutcome>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    let revision = acquire_save_gate(store, applicant_id)?;
    let result = persist_section(repo, applicant_id, section, &payload, revision, true);
    settle_save(store, applicant_id, section, &payload, &result);
    result
}

/// Submits the step-1 payload together with an exception-request message,
/// marks the request pending, and re-fetches the draft so the server's
/// status field lands in `data`. The step counter does not advance.
pub fn request_special_consideration<R>(
    repo: &R,
    store: &DraftStore,
    applicant_id: &ApplicantId,
    payload: Map<String, Value>,
    message: ConsiderationMessage,
) -> ServiceResult<ApplicationDraft>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    let revision = acquire_save_gate(store, applicant_id)?;
    let result = persist_section(
        repo,
        applicant_id,
        Section::Applicability,
        &payload,
        revision,
        false,
    )
    .and_then(|outcome| {
        repo.set_consideration(
            applicant_id.as_str(),
            ConsiderationStatus::Pending,
            Some(message.as_str()),
        )
        .map_err(|err| {
            log::error!("Failed to record special consideration for {applicant_id}: {err}");
            ServiceError::from(err)
        })?;
        Ok(outcome)
    });
    settle_save(store, applicant_id, Section::Applicability, &payload, &result);
    result?;

    get_upload_details(repo, store, applicant_id)
}

/// Delegates to the document gateway and returns the durable document id.
///
/// Wrapped by the pending-upload gate so the active step cannot save while
/// the upload is in flight. Failures land in the `document` error slot and
/// propagate unmodified.
pub fn upload_document<R>(
    repo: &R,
    store: &DraftStore,
    uploads_dir: &Path,
    applicant_id: &ApplicantId,
    upload: DocumentUpload,
) -> ServiceResult<Document>
where
    R: DocumentWriter + ?Sized,
{
    store.begin_upload(applicant_id.as_str());

    let result = (|| {
        let new_document = NewDocument::new(
            applicant_id.as_str(),
            &upload.file_name,
            upload.content_type.clone(),
            upload.bytes.len() as i64,
        );
        let document = repo.create_document(&new_document).map_err(|err| {
            log::error!("Failed to persist document for {applicant_id}: {err}");
            ServiceError::from(err)
        })?;

        std::fs::create_dir_all(uploads_dir)?;
        std::fs::write(uploads_dir.join(&document.stored_name), &upload.bytes)?;
        Ok(document)
    })();

    store.finish_upload(
        applicant_id.as_str(),
        result.as_ref().err().map(ToString::to_string),
    );
    result
}

/// Eligibility answers carried by a step-1 payload: every boolean value of
/// the applicability object.
pub fn applicability_answers(payload: &Map<String, Value>) -> Vec<bool> {
    payload
        .get(Section::Applicability.payload_key())
        .and_then(Value::as_object)
        .map(|answers| answers.values().filter_map(Value::as_bool).collect())
        .unwrap_or_default()
}

fn application_fields(application: &Application) -> Map<String, Value> {
    let mut fields = application
        .data
        .get(APPLICATION_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(membership_type) = &application.membership_type {
        fields.insert(
            "membershipType".to_string(),
            json!(membership_type.to_string()),
        );
    }
    fields.insert(
        "specialConsideration".to_string(),
        json!({
            "status": application.special_consideration.status.to_string(),
            "message": application.special_consideration.message,
        }),
    );
    fields
}

fn acquire_save_gate(store: &DraftStore, applicant_id: &ApplicantId) -> ServiceResult<i64> {
    store.with_draft(applicant_id.as_str(), |draft| {
        if draft.pending_uploads > 0 {
            return Err(ServiceError::UploadsPending(draft.pending_uploads));
        }
        if draft.is_saving {
            return Err(ServiceError::SaveInProgress);
        }
        draft.apply(DraftAction::SetSaving(true));
        Ok(draft.revision)
    })
}

fn settle_save(
    store: &DraftStore,
    applicant_id: &ApplicantId,
    section: Section,
    payload: &Map<String, Value>,
    result: &ServiceResult<SectionOutcome>,
) {
    store.with_draft(applicant_id.as_str(), |draft| {
        draft.apply(DraftAction::SetSaving(false));
        match result {
            Ok(outcome) => {
                draft.apply(DraftAction::SetError(ErrorSlot::Save, String::new()));
                draft.apply(DraftAction::UpdateFormData(payload_to_data_keys(
                    payload.clone(),
                )));
                draft.apply(DraftAction::SetCurrentStep(outcome.next_step));
                draft.mark_completed(section.step());
                draft.revision = outcome.application.revision;
            }
            Err(err) => {
                draft.apply(DraftAction::SetError(ErrorSlot::Save, err.to_string()));
            }
        }
    });
}

fn persist_section<R>(
    repo: &R,
    applicant_id: &ApplicantId,
    section: Section,
    payload: &Map<String, Value>,
    revision: i64,
    advance: bool,
) -> ServiceResult<SectionOutcome>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    let stored = repo.get_application(applicant_id.as_str()).map_err(|err| {
        log::error!("Failed to read application for {applicant_id}: {err}");
        ServiceError::from(err)
    })?;

    if stored.as_ref().is_some_and(Application::is_submitted) {
        return Err(ServiceError::AlreadySubmitted);
    }

    // A "no" eligibility answer blocks step 1 until an admin has approved an
    // exception request; the exception request itself skips the check.
    if advance
        && section == Section::Applicability
        && special_consideration_required(&applicability_answers(payload))
    {
        let approved = stored
            .as_ref()
            .is_some_and(|application| application.special_consideration.is_approved());
        if !approved {
            return Err(ServiceError::SpecialConsiderationRequired);
        }
    }

    let next_step = if advance {
        section.next().map(Section::step).unwrap_or(section.step())
    } else {
        section.step()
    };
    let save = SectionSave {
        section,
        payload: payload_to_data_keys(payload.clone()),
        expected_revision: revision,
        next_step,
        submit: advance && section.is_last(),
    };

    let application = repo.save_section(applicant_id.as_str(), &save).map_err(|err| {
        log::error!("Failed to save {section} for {applicant_id}: {err}");
        ServiceError::from(err)
    })?;

    Ok(SectionOutcome {
        application,
        next_step,
        submitted: save.submit,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::domain::application::{ApplicationStatus, SpecialConsideration};
    use crate::domain::document::stored_name;
    use crate::repository::ApplicationListQuery;
    use crate::repository::errors::{RepositoryError, RepositoryResult};

    #[derive(Default)]
    struct InMemoryRepo {
        stored: RefCell<Option<Application>>,
        fail_saves: bool,
        fail_documents: bool,
    }

    fn empty_application(applicant_id: &str) -> Application {
        let now = Utc::now().naive_utc();
        Application {
            id: 1,
            applicant_id: applicant_id.to_string(),
            membership_type: None,
            status: ApplicationStatus::Draft,
            special_consideration: SpecialConsideration::none(),
            data: Map::new(),
            current_step: 1,
            completed_steps: Default::default(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    impl ApplicationReader for InMemoryRepo {
        fn get_application(&self, _applicant_id: &str) -> RepositoryResult<Option<Application>> {
            Ok(self.stored.borrow().clone())
        }

        fn get_application_by_id(&self, _id: i32) -> RepositoryResult<Option<Application>> {
            Ok(self.stored.borrow().clone())
        }

        fn list_applications(
            &self,
            _query: ApplicationListQuery,
        ) -> RepositoryResult<(usize, Vec<Application>)> {
            Ok(match self.stored.borrow().clone() {
                Some(application) => (1, vec![application]),
                None => (0, vec![]),
            })
        }
    }

    impl ApplicationWriter for InMemoryRepo {
        fn save_section(
            &self,
            applicant_id: &str,
            save: &SectionSave,
        ) -> RepositoryResult<Application> {
            if self.fail_saves {
                return Err(RepositoryError::DatabaseError("disk full".to_string()));
            }
            let mut stored = self.stored.borrow_mut();
            let mut application = stored
                .clone()
                .unwrap_or_else(|| empty_application(applicant_id));
            if save.expected_revision != application.revision {
                return Err(RepositoryError::StaleRevision {
                    expected: save.expected_revision,
                    stored: application.revision,
                });
            }
            for (key, value) in save.payload.clone() {
                application.data.insert(key, value);
            }
            application.completed_steps.insert(save.section.step());
            application.current_step = save.next_step;
            if save.submit {
                application.status = ApplicationStatus::Submitted;
            }
            application.revision += 1;
            *stored = Some(application.clone());
            Ok(application)
        }

        fn set_consideration(
            &self,
            _applicant_id: &str,
            status: ConsiderationStatus,
            message: Option<&str>,
        ) -> RepositoryResult<Application> {
            let mut stored = self.stored.borrow_mut();
            let mut application = stored.clone().ok_or(RepositoryError::NotFound)?;
            application.special_consideration = SpecialConsideration {
                status,
                message: message.map(str::to_string),
            };
            *stored = Some(application.clone());
            Ok(application)
        }
    }

    impl DocumentWriter for InMemoryRepo {
        fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document> {
            if self.fail_documents {
                return Err(RepositoryError::ValidationError(
                    "unsupported file type".to_string(),
                ));
            }
            Ok(Document {
                id: 245,
                applicant_id: new_document.applicant_id.clone(),
                file_name: new_document.file_name.clone(),
                stored_name: stored_name(245, &new_document.file_name),
                content_type: new_document.content_type.clone(),
                size_bytes: new_document.size_bytes,
                created_at: Utc::now().naive_utc(),
            })
        }
    }

    fn applicability_payload(all_yes: bool) -> Map<String, Value> {
        match json!({
            "applicability": {
                "isLicensedEntity": true,
                "operatesInBankingSector": all_yes,
                "hasPhysicalPresence": true,
                "acceptsCodeOfConduct": true,
            },
            "application": {"membershipType": "Principal"},
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn applicant() -> ApplicantId {
        ApplicantId::new("u-1").unwrap()
    }

    #[test]
    fn all_yes_step_one_advances_to_step_two() {
        let repo = InMemoryRepo::default();
        let store = DraftStore::new();

        let outcome = save_upload_details(
            &repo,
            &store,
            &applicant(),
            Section::Applicability,
            applicability_payload(true),
        )
        .unwrap();

        assert_eq!(outcome.next_step, 2);
        assert!(!outcome.submitted);

        let draft = store.snapshot("u-1");
        assert_eq!(draft.current_step, 2);
        assert!(draft.section_object(Section::Applicability).is_some());
        assert!(!draft.is_saving);
        assert_eq!(draft.errors.save, "");
        assert_eq!(draft.revision, 1);
    }

    #[test]
    fn a_no_answer_without_approval_blocks_step_one() {
        let repo = InMemoryRepo::default();
        let store = DraftStore::new();

        let result = save_upload_details(
            &repo,
            &store,
            &applicant(),
            Section::Applicability,
            applicability_payload(false),
        );

        assert!(matches!(
            result,
            Err(ServiceError::SpecialConsiderationRequired)
        ));
        let draft = store.snapshot("u-1");
        assert_eq!(draft.current_step, 1);
        assert!(!draft.is_saving);
        assert!(!draft.errors.save.is_empty());
    }

    #[test]
    fn consideration_request_then_approval_unblocks_step_one() {
        let repo = InMemoryRepo::default();
        let store = DraftStore::new();
        let id = applicant();

        let draft = request_special_consideration(
            &repo,
            &store,
            &id,
            applicability_payload(false),
            ConsiderationMessage::new("licence renewal is underway").unwrap(),
        )
        .unwrap();

        // The answers are saved but the step does not advance.
        assert_eq!(draft.current_step, 1);
        assert_eq!(
            draft
                .application_object()
                .and_then(|fields| fields.get("specialConsideration"))
                .and_then(|consideration| consideration.get("status")),
            Some(&json!("pending"))
        );

        repo.set_consideration(id.as_str(), ConsiderationStatus::Approved, None)
            .unwrap();

        let outcome = save_upload_details(
            &repo,
            &store,
            &id,
            Section::Applicability,
            applicability_payload(false),
        )
        .unwrap();
        assert_eq!(outcome.next_step, 2);
    }

    #[test]
    fn saving_is_refused_while_uploads_are_pending() {
        let repo = InMemoryRepo::default();
        let store = DraftStore::new();
        let id = applicant();

        store.begin_upload(id.as_str());
        let blocked = save_upload_details(
            &repo,
            &store,
            &id,
            Section::Applicability,
            applicability_payload(true),
        );
        assert!(matches!(blocked, Err(ServiceError::UploadsPending(1))));

        store.finish_upload(id.as_str(), None);
        let outcome = save_upload_details(
            &repo,
            &store,
            &id,
            Section::Applicability,
            applicability_payload(true),
        )
        .unwrap();
        assert_eq!(outcome.next_step, 2);
    }

    #[test]
    fn a_failed_save_keeps_the_step_and_rethrows_the_original_error() {
        let repo = InMemoryRepo {
            fail_saves: true,
            ..Default::default()
        };
        let store = DraftStore::new();

        let result = save_upload_details(
            &repo,
            &store,
            &applicant(),
            Section::Applicability,
            applicability_payload(true),
        );

        match result {
            Err(ServiceError::Repository(RepositoryError::DatabaseError(message))) => {
                assert_eq!(message, "disk full");
            }
            other => panic!("expected the repository error to pass through, got {other:?}"),
        }
        let draft = store.snapshot("u-1");
        assert_eq!(draft.current_step, 1);
        assert!(!draft.is_saving);
        assert!(draft.errors.save.contains("disk full"));
    }

    #[test]
    fn final_section_submits_instead_of_advancing() {
        let repo = InMemoryRepo::default();
        let store = DraftStore::new();
        let id = applicant();

        // Walk the earlier steps so the revision bookkeeping stays honest.
        save_upload_details(
            &repo,
            &store,
            &id,
            Section::Applicability,
            applicability_payload(true),
        )
        .unwrap();

        let payload = match json!({"declarationConsent": {"declarationAccepted": true}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let outcome =
            save_upload_details(&repo, &store, &id, Section::DeclarationConsent, payload).unwrap();

        assert!(outcome.submitted);
        assert_eq!(outcome.next_step, Section::LAST_STEP);
        assert!(outcome.application.is_submitted());

        // Further saves are refused once submitted.
        let again = save_upload_details(
            &repo,
            &store,
            &id,
            Section::Applicability,
            applicability_payload(true),
        );
        assert!(matches!(again, Err(ServiceError::AlreadySubmitted)));
    }

    #[test]
    fn upload_failure_lands_in_the_document_slot() {
        let repo = InMemoryRepo {
            fail_documents: true,
            ..Default::default()
        };
        let store = DraftStore::new();
        let dir = tempfile::tempdir().unwrap();

        let result = upload_document(
            &repo,
            &store,
            dir.path(),
            &applicant(),
            DocumentUpload {
                file_name: "report.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"%PDF-1.4".to_vec(),
            },
        );

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::ValidationError(_)))
        ));
        let draft = store.snapshot("u-1");
        assert_eq!(draft.pending_uploads, 0);
        assert!(draft.errors.document.contains("unsupported file type"));
    }

    #[test]
    fn upload_writes_the_file_under_its_stored_name() {
        let repo = InMemoryRepo::default();
        let store = DraftStore::new();
        let dir = tempfile::tempdir().unwrap();

        let document = upload_document(
            &repo,
            &store,
            dir.path(),
            &applicant(),
            DocumentUpload {
                file_name: "report.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"%PDF-1.4".to_vec(),
            },
        )
        .unwrap();

        assert_eq!(document.stored_name, "245_report.pdf");
        assert!(dir.path().join("245_report.pdf").exists());
        assert_eq!(store.snapshot("u-1").pending_uploads, 0);
    }

    #[test]
    fn hydration_normalizes_flat_legacy_data() {
        let repo = InMemoryRepo::default();
        let mut legacy = empty_application("u-1");
        legacy.data = match json!({"requiredDocs": {"tradeLicenseAndMoaFileId": 5}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        legacy.current_step = 6;
        repo.stored.replace(Some(legacy));

        let store = DraftStore::new();
        let draft = get_upload_details(&repo, &store, &applicant()).unwrap();

        assert_eq!(draft.current_step, 6);
        assert_eq!(draft.user_id.as_deref(), Some("u-1"));
        assert_eq!(
            draft
                .section_object(Section::RequiredDocs)
                .and_then(|docs| docs.get("tradeLicenseAndMoaFileId")),
            Some(&json!(5))
        );
    }
}
