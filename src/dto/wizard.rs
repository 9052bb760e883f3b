//! DTOs shaped for the wizard step templates and the upload endpoint.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::draft::ApplicationDraft;
use crate::domain::section::Section;

/// JSON body returned by the upload endpoint; the id is what section forms
/// put into their hidden file-id fields.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i32,
    pub stored_name: String,
}

/// One row of the "other forms" editor. The `id` only keys the row in the
/// template; it is generated per render and never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OtherFormRow {
    pub id: Uuid,
    pub name: String,
    pub file_id: Option<i64>,
}

/// Everything a wizard step template needs.
#[derive(Serialize)]
pub struct WizardPageData {
    pub section: Section,
    pub step: u8,
    pub title: &'static str,
    pub draft: ApplicationDraft,
    pub other_forms: Vec<OtherFormRow>,
}

impl WizardPageData {
    pub fn new(section: Section, draft: ApplicationDraft) -> Self {
        let other_forms = other_form_rows(&draft);
        Self {
            section,
            step: section.step(),
            title: section.title(),
            draft,
            other_forms,
        }
    }
}

fn other_form_rows(draft: &ApplicationDraft) -> Vec<OtherFormRow> {
    draft
        .section_object(Section::RequiredDocs)
        .and_then(|documents| documents.get("otherForms"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .map(|entry| OtherFormRow {
                    id: Uuid::new_v4(),
                    name: entry
                        .get("otherFormName")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    file_id: entry.get("otherFormFileId").and_then(Value::as_i64),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::draft::DraftAction;

    #[test]
    fn other_form_rows_are_derived_from_the_draft() {
        let mut draft = ApplicationDraft::new();
        draft.apply(DraftAction::UpdateFormData(
            match json!({
                "memberRequiredDocuments": {
                    "otherForms": [
                        {"otherFormName": "Wolfsberg questionnaire", "otherFormFileId": 12},
                        {"otherFormName": "Cover letter", "otherFormFileId": null},
                    ],
                },
            }) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            },
        ));

        let page = WizardPageData::new(Section::RequiredDocs, draft);
        assert_eq!(page.step, 6);
        assert_eq!(page.other_forms.len(), 2);
        assert_eq!(page.other_forms[0].name, "Wolfsberg questionnaire");
        assert_eq!(page.other_forms[0].file_id, Some(12));
        assert_eq!(page.other_forms[1].file_id, None);
        // Row keys are client-local only; two renders never share them.
        assert_ne!(page.other_forms[0].id, page.other_forms[1].id);
    }
}
