//! In-memory draft store owned by the composition root.
//!
//! One [`ApplicationDraft`] per applicant for the lifetime of the process,
//! handed to handlers by reference (`web::Data`) instead of living in module
//! globals. All mutation goes through [`DraftStore::with_draft`], which also
//! serializes access, so reducer transitions never interleave.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::draft::{ApplicationDraft, DraftAction, ErrorSlot};

#[derive(Default)]
pub struct DraftStore {
    drafts: Mutex<HashMap<String, ApplicationDraft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the applicant's draft, creating an empty one on first
    /// touch.
    pub fn with_draft<T>(
        &self,
        applicant_id: &str,
        f: impl FnOnce(&mut ApplicationDraft) -> T,
    ) -> T {
        let mut drafts = self
            .drafts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let draft = drafts
            .entry(applicant_id.to_string())
            .or_insert_with(ApplicationDraft::new);
        f(draft)
    }

    /// Clone of the applicant's current draft, for rendering.
    pub fn snapshot(&self, applicant_id: &str) -> ApplicationDraft {
        self.with_draft(applicant_id, |draft| draft.clone())
    }

    /// Marks one upload as in flight; section saves are refused while any
    /// upload is pending.
    pub fn begin_upload(&self, applicant_id: &str) {
        self.with_draft(applicant_id, |draft| {
            draft.pending_uploads += 1;
        });
    }

    /// Settles one upload, recording the failure message in the `document`
    /// error slot (or clearing it on success).
    pub fn finish_upload(&self, applicant_id: &str, error: Option<String>) {
        self.with_draft(applicant_id, |draft| {
            draft.pending_uploads = draft.pending_uploads.saturating_sub(1);
            draft.apply(DraftAction::SetError(
                ErrorSlot::Document,
                error.unwrap_or_default(),
            ));
        });
    }

    pub fn reset(&self, applicant_id: &str) {
        self.with_draft(applicant_id, |draft| draft.apply(DraftAction::ResetForm));
    }
}
