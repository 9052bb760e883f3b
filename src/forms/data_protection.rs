use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::requirements::dpo_details_required;
use crate::domain::types::ContactEmail;
use crate::forms::{FormError, into_object};

/// Step 7: data-protection consents. Processing consent is a hard
/// requirement; DPO details are required only when an officer is declared.
#[derive(Debug, Deserialize, Validate)]
pub struct DataProtectionForm {
    #[serde(default)]
    pub consent_to_processing: bool,
    #[serde(default)]
    pub agrees_to_privacy_notice: bool,
    #[serde(default)]
    pub has_data_protection_officer: bool,
    pub dpo_name: Option<String>,
    pub dpo_email: Option<String>,
}

impl DataProtectionForm {
    pub fn validate_requirements(&self) -> Result<(), FormError> {
        if !self.consent_to_processing {
            return Err(FormError::MissingField("consent to data processing"));
        }
        if !self.agrees_to_privacy_notice {
            return Err(FormError::MissingField("agreement to the privacy notice"));
        }
        if dpo_details_required(self.has_data_protection_officer) {
            if self
                .dpo_name
                .as_deref()
                .map(str::trim)
                .is_none_or(str::is_empty)
            {
                return Err(FormError::MissingField("data protection officer name"));
            }
            match self.dpo_email.as_deref() {
                Some(email) => {
                    ContactEmail::new(email)?;
                }
                None => return Err(FormError::MissingField("data protection officer email")),
            }
        }
        Ok(())
    }

    pub fn payload(&self) -> Map<String, Value> {
        into_object(json!({
            "dataProtection": {
                "consentToProcessing": self.consent_to_processing,
                "agreesToPrivacyNotice": self.agrees_to_privacy_notice,
                "hasDataProtectionOfficer": self.has_data_protection_officer,
                "dpoName": self.dpo_name,
                "dpoEmail": self.dpo_email,
            },
        }))
    }
}
