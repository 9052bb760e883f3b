use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::document::resolve_file_id;
use crate::domain::requirements::signature_date_valid;
use crate::forms::{FormError, into_object};

/// Step 8: the closing declaration. Both acknowledgements must be granted,
/// the captured signature image must have been uploaded, and the signature
/// cannot be dated in the future.
#[derive(Debug, Deserialize, Validate)]
pub struct DeclarationForm {
    #[serde(default)]
    pub declaration_accepted: bool,
    #[serde(default)]
    pub information_accurate: bool,
    #[validate(length(min = 1))]
    pub signatory_name: String,
    #[validate(length(min = 1))]
    pub signatory_designation: String,
    pub signature_date: NaiveDate,
    pub signature_file_id: Option<i64>,
    pub signature_path: Option<String>,
}

impl DeclarationForm {
    pub fn signature_id(&self) -> Option<i64> {
        resolve_file_id(self.signature_file_id, self.signature_path.as_deref())
    }

    pub fn validate_requirements(&self, today: NaiveDate) -> Result<(), FormError> {
        if !self.declaration_accepted {
            return Err(FormError::MissingField("the membership declaration"));
        }
        if !self.information_accurate {
            return Err(FormError::MissingField("the accuracy acknowledgement"));
        }
        if !signature_date_valid(self.signature_date, today) {
            return Err(FormError::Invalid(
                "the signature cannot be dated in the future".to_string(),
            ));
        }
        if self.signature_id().is_none() {
            return Err(FormError::MissingDocument("the signature"));
        }
        Ok(())
    }

    pub fn payload(&self) -> Map<String, Value> {
        into_object(json!({
            "declarationConsent": {
                "declarationAccepted": self.declaration_accepted,
                "informationAccurate": self.information_accurate,
                "signatoryName": self.signatory_name.trim(),
                "signatoryDesignation": self.signatory_designation.trim(),
                "signatureDate": self.signature_date,
                "signatureFileId": self.signature_id(),
            },
        }))
    }
}
