use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::document::resolve_file_id;
use crate::domain::requirements::{document_file_required, ids_or_sentinel};
use crate::forms::{FormError, into_object};

/// One fixed document slot of step 6: its wire field names, whether the
/// applicant ticked it as provided, and the resolved document id.
#[derive(Debug, Clone)]
pub struct DocumentSlot {
    pub label: &'static str,
    pub file_field: &'static str,
    pub checked_field: &'static str,
    pub checked: bool,
    pub file_id: Option<i64>,
}

/// Step 6: the required-document checklist. Every slot has an
/// `isChecked_<Field>` companion boolean; a ticked slot must carry a
/// document id. Free-form extra documents travel in `otherForms`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RequiredDocumentsForm {
    #[serde(default)]
    pub is_checked_trade_license_and_moa: bool,
    pub trade_license_and_moa_file_id: Option<i64>,
    pub trade_license_and_moa_path: Option<String>,
    #[serde(default)]
    pub is_checked_certificate_of_incorporation: bool,
    pub certificate_of_incorporation_file_id: Option<i64>,
    pub certificate_of_incorporation_path: Option<String>,
    #[serde(default)]
    pub is_checked_board_resolution: bool,
    pub board_resolution_file_id: Option<i64>,
    pub board_resolution_path: Option<String>,
    #[serde(default)]
    pub is_checked_audited_financial_statements: bool,
    pub audited_financial_statements_file_id: Option<i64>,
    pub audited_financial_statements_path: Option<String>,
    #[serde(default)]
    pub is_checked_organization_chart: bool,
    pub organization_chart_file_id: Option<i64>,
    pub organization_chart_path: Option<String>,
    #[serde(default)]
    pub is_checked_aml_questionnaire: bool,
    pub aml_questionnaire_file_id: Option<i64>,
    pub aml_questionnaire_path: Option<String>,
    #[serde(default)]
    pub other_form_name: Vec<String>,
    #[serde(default)]
    pub other_form_file_id: Vec<String>,
}

impl RequiredDocumentsForm {
    pub fn slots(&self) -> [DocumentSlot; 6] {
        [
            DocumentSlot {
                label: "Trade license and MOA",
                file_field: "tradeLicenseAndMoaFileId",
                checked_field: "isChecked_TradeLicenseAndMoa",
                checked: self.is_checked_trade_license_and_moa,
                file_id: resolve_file_id(
                    self.trade_license_and_moa_file_id,
                    self.trade_license_and_moa_path.as_deref(),
                ),
            },
            DocumentSlot {
                label: "Certificate of incorporation",
                file_field: "certificateOfIncorporationFileId",
                checked_field: "isChecked_CertificateOfIncorporation",
                checked: self.is_checked_certificate_of_incorporation,
                file_id: resolve_file_id(
                    self.certificate_of_incorporation_file_id,
                    self.certificate_of_incorporation_path.as_deref(),
                ),
            },
            DocumentSlot {
                label: "Board resolution",
                file_field: "boardResolutionFileId",
                checked_field: "isChecked_BoardResolution",
                checked: self.is_checked_board_resolution,
                file_id: resolve_file_id(
                    self.board_resolution_file_id,
                    self.board_resolution_path.as_deref(),
                ),
            },
            DocumentSlot {
                label: "Audited financial statements",
                file_field: "auditedFinancialStatementsFileId",
                checked_field: "isChecked_AuditedFinancialStatements",
                checked: self.is_checked_audited_financial_statements,
                file_id: resolve_file_id(
                    self.audited_financial_statements_file_id,
                    self.audited_financial_statements_path.as_deref(),
                ),
            },
            DocumentSlot {
                label: "Organization chart",
                file_field: "organizationChartFileId",
                checked_field: "isChecked_OrganizationChart",
                checked: self.is_checked_organization_chart,
                file_id: resolve_file_id(
                    self.organization_chart_file_id,
                    self.organization_chart_path.as_deref(),
                ),
            },
            DocumentSlot {
                label: "AML questionnaire",
                file_field: "amlQuestionnaireFileId",
                checked_field: "isChecked_AmlQuestionnaire",
                checked: self.is_checked_aml_questionnaire,
                file_id: resolve_file_id(
                    self.aml_questionnaire_file_id,
                    self.aml_questionnaire_path.as_deref(),
                ),
            },
        ]
    }

    /// Extra documents beyond the fixed checklist. Rows without a name are
    /// dropped; a named row may still be waiting for its upload.
    pub fn other_forms(&self) -> Vec<(String, Option<i64>)> {
        self.other_form_name
            .iter()
            .zip(
                self.other_form_file_id
                    .iter()
                    .map(|id| id.trim().parse::<i64>().ok())
                    .chain(std::iter::repeat(None)),
            )
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, file_id)| (name.trim().to_string(), file_id))
            .collect()
    }

    pub fn validate_requirements(&self) -> Result<(), FormError> {
        for slot in self.slots() {
            if document_file_required(slot.checked) && slot.file_id.is_none() {
                return Err(FormError::MissingDocument(slot.label));
            }
        }
        Ok(())
    }

    pub fn payload(&self) -> Map<String, Value> {
        let mut section = Map::new();
        let mut supporting_ids = Vec::new();
        for slot in self.slots() {
            section.insert(slot.file_field.to_string(), json!(slot.file_id));
            section.insert(slot.checked_field.to_string(), json!(slot.checked));
            if let Some(file_id) = slot.file_id {
                supporting_ids.push(file_id);
            }
        }

        let other_forms: Vec<Value> = self
            .other_forms()
            .into_iter()
            .map(|(name, file_id)| {
                json!({"otherFormName": name, "otherFormFileId": file_id})
            })
            .collect();
        section.insert("otherForms".to_string(), Value::Array(other_forms));
        section.insert(
            "supportingFileIds".to_string(),
            json!(ids_or_sentinel(supporting_ids)),
        );

        into_object(json!({"memberRequiredDocuments": section}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalizer::MEMBER_REQUIRED_DOCUMENT_FIELDS;

    #[test]
    fn a_ticked_slot_needs_its_document() {
        let mut form = RequiredDocumentsForm {
            is_checked_board_resolution: true,
            ..Default::default()
        };
        assert!(matches!(
            form.validate_requirements(),
            Err(FormError::MissingDocument("Board resolution"))
        ));

        form.board_resolution_path = Some("/files/245_resolution.pdf".to_string());
        form.validate_requirements().unwrap();
    }

    #[test]
    fn unticked_slots_are_optional() {
        RequiredDocumentsForm::default().validate_requirements().unwrap();
    }

    #[test]
    fn empty_checklist_submits_the_zero_sentinel() {
        let payload = RequiredDocumentsForm::default().payload();
        let section = payload.get("memberRequiredDocuments").unwrap();
        assert_eq!(section.get("supportingFileIds"), Some(&json!([0])));
    }

    #[test]
    fn resolved_ids_replace_the_sentinel() {
        let form = RequiredDocumentsForm {
            is_checked_board_resolution: true,
            board_resolution_file_id: Some(7),
            trade_license_and_moa_path: Some("/files/5_moa.pdf".to_string()),
            ..Default::default()
        };
        let payload = form.payload();
        let section = payload.get("memberRequiredDocuments").unwrap();
        assert_eq!(section.get("supportingFileIds"), Some(&json!([5, 7])));
        assert_eq!(section.get("boardResolutionFileId"), Some(&json!(7)));
        assert_eq!(section.get("isChecked_BoardResolution"), Some(&json!(true)));
    }

    #[test]
    fn other_forms_drop_nameless_rows_and_keep_pending_ones() {
        let form = RequiredDocumentsForm {
            other_form_name: vec![
                "Wolfsberg questionnaire".to_string(),
                "  ".to_string(),
                "Cover letter".to_string(),
            ],
            other_form_file_id: vec!["12".to_string(), "9".to_string()],
            ..Default::default()
        };
        assert_eq!(
            form.other_forms(),
            vec![
                ("Wolfsberg questionnaire".to_string(), Some(12)),
                ("Cover letter".to_string(), None),
            ]
        );

        let payload = form.payload();
        let section = payload.get("memberRequiredDocuments").unwrap();
        assert_eq!(
            section.get("otherForms"),
            Some(&json!([
                {"otherFormName": "Wolfsberg questionnaire", "otherFormFileId": 12},
                {"otherFormName": "Cover letter", "otherFormFileId": null},
            ]))
        );
    }

    #[test]
    fn payload_fields_belong_to_the_normalizer_cluster() {
        let payload = RequiredDocumentsForm::default().payload();
        let section = payload
            .get("memberRequiredDocuments")
            .and_then(Value::as_object)
            .unwrap();
        for key in section.keys() {
            assert!(
                MEMBER_REQUIRED_DOCUMENT_FIELDS.contains(&key.as_str()),
                "{key} is not a recognized required-document field"
            );
        }
    }
}
