use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::section::{APPLICATION_KEY, Section};

/// Per-category error slots of the draft. An empty string means no error.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct DraftErrors {
    pub fetch: String,
    pub save: String,
    pub document: String,
}

/// Which error slot a [`DraftAction::SetError`] targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorSlot {
    Fetch,
    Save,
    Document,
}

/// State transitions understood by [`ApplicationDraft::apply`].
#[derive(Clone, Debug)]
pub enum DraftAction {
    SetLoading(bool),
    SetSaving(bool),
    SetCurrentStep(u8),
    UpdateFormData(Map<String, Value>),
    SetUserId(String),
    SetError(ErrorSlot, String),
    ClearErrors,
    ResetForm,
}

/// The single in-memory, cumulative representation of one applicant's
/// in-progress membership application.
///
/// Created empty, hydrated from the stored application, then mutated
/// step-by-step through [`ApplicationDraft::apply`]. Only an explicit
/// [`DraftAction::ResetForm`] discards it.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ApplicationDraft {
    /// Nested answers keyed by section data key (plus `application` for
    /// top-level fields).
    pub data: Map<String, Value>,
    /// 1-based step currently presented to the applicant.
    pub current_step: u8,
    /// Steps whose section save has succeeded.
    pub completed_steps: BTreeSet<u8>,
    pub is_loading: bool,
    pub is_saving: bool,
    /// Uploads in flight for the active step; saving is refused while > 0.
    pub pending_uploads: usize,
    pub user_id: Option<String>,
    pub errors: DraftErrors,
    /// Monotonic save token; a persisted save carrying an older revision is
    /// rejected instead of overwriting newer data.
    pub revision: i64,
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationDraft {
    pub fn new() -> Self {
        Self {
            data: Map::new(),
            current_step: Section::FIRST_STEP,
            completed_steps: BTreeSet::new(),
            is_loading: false,
            is_saving: false,
            pending_uploads: 0,
            user_id: None,
            errors: DraftErrors::default(),
            revision: 0,
        }
    }

    /// Applies a synchronous reducer transition.
    pub fn apply(&mut self, action: DraftAction) {
        match action {
            DraftAction::SetLoading(value) => self.is_loading = value,
            DraftAction::SetSaving(value) => self.is_saving = value,
            DraftAction::SetCurrentStep(step) => self.current_step = step,
            DraftAction::UpdateFormData(payload) => self.merge_sections(payload),
            DraftAction::SetUserId(user_id) => self.user_id = Some(user_id),
            DraftAction::SetError(slot, message) => match slot {
                ErrorSlot::Fetch => self.errors.fetch = message,
                ErrorSlot::Save => self.errors.save = message,
                ErrorSlot::Document => self.errors.document = message,
            },
            DraftAction::ClearErrors => self.errors = DraftErrors::default(),
            DraftAction::ResetForm => *self = Self::new(),
        }
    }

    /// Merges a payload into `data` with **shallow** semantics: each incoming
    /// top-level key wholesale-replaces the stored value under that key.
    ///
    /// A caller submitting `{"financialThreshold": {"x": 1}}` after a previous
    /// `{"financialThreshold": {"y": 2}}` therefore loses `y` unless it
    /// re-includes it. Section orchestrators always submit the full section
    /// object, which is what makes replace-on-write safe; any future change of
    /// policy belongs here and nowhere else.
    pub fn merge_sections(&mut self, payload: Map<String, Value>) {
        for (key, value) in payload {
            self.data.insert(key, value);
        }
    }

    /// Borrow a section's answers, when present as an object.
    pub fn section_object(&self, section: Section) -> Option<&Map<String, Value>> {
        self.data.get(section.data_key()).and_then(Value::as_object)
    }

    /// Borrow the top-level `application` fields, when present.
    pub fn application_object(&self) -> Option<&Map<String, Value>> {
        self.data.get(APPLICATION_KEY).and_then(Value::as_object)
    }

    /// Look up a string field inside a section, e.g. a previously saved
    /// document path used for resume-from-upload.
    pub fn section_str(&self, section: Section, field: &str) -> Option<&str> {
        self.section_object(section)
            .and_then(|object| object.get(field))
            .and_then(Value::as_str)
    }

    pub fn mark_completed(&mut self, step: u8) {
        self.completed_steps.insert(step);
    }

    pub fn is_completed(&self, step: u8) -> bool {
        self.completed_steps.contains(&step)
    }
}

/// Rewrites wire payload keys to draft data keys.
///
/// Section payloads are submitted under [`Section::payload_key`]; the draft
/// and the stored application are keyed by [`Section::data_key`]. The two only
/// diverge for the bank-relationship section, but the translation is driven by
/// the section table so a future rename stays a one-line change.
pub fn payload_to_data_keys(payload: Map<String, Value>) -> Map<String, Value> {
    let mut translated = Map::new();
    for (key, value) in payload {
        let data_key = Section::ALL
            .iter()
            .find(|section| section.payload_key() == key)
            .map(|section| section.data_key().to_string())
            .unwrap_or(key);
        translated.insert(data_key, value);
    }
    translated
}
