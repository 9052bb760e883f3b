use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::document::resolve_file_id;
use crate::domain::requirements::{
    aml_policy_required, regulator_details_required, sanction_details_required,
};
use crate::domain::types::ContactEmail;
use crate::forms::{FormError, into_object};

/// Step 5: regulatory compliance. Three independent conditional branches:
/// regulator details for regulated entities, an AML policy document for
/// declared AML programs, and sanction details for past sanctions.
#[derive(Debug, Deserialize, Validate)]
pub struct RegulatoryComplianceForm {
    #[serde(default)]
    pub is_regulated: bool,
    pub regulator_name: Option<String>,
    pub regulatory_license_number: Option<String>,
    pub regulatory_license_file_id: Option<i64>,
    pub regulatory_license_path: Option<String>,
    #[serde(default)]
    pub has_aml_program: bool,
    pub aml_policy_file_id: Option<i64>,
    pub aml_policy_path: Option<String>,
    #[serde(default)]
    pub has_compliance_officer: bool,
    pub compliance_officer_name: Option<String>,
    pub compliance_officer_email: Option<String>,
    #[serde(default)]
    pub has_been_sanctioned: bool,
    pub sanction_details: Option<String>,
    #[serde(default)]
    pub operates_in_fatf_jurisdiction: bool,
}

fn blank(value: Option<&str>) -> bool {
    value.map(str::trim).is_none_or(str::is_empty)
}

impl RegulatoryComplianceForm {
    pub fn license_file_id(&self) -> Option<i64> {
        resolve_file_id(
            self.regulatory_license_file_id,
            self.regulatory_license_path.as_deref(),
        )
    }

    pub fn aml_file_id(&self) -> Option<i64> {
        resolve_file_id(self.aml_policy_file_id, self.aml_policy_path.as_deref())
    }

    pub fn validate_requirements(&self) -> Result<(), FormError> {
        if regulator_details_required(self.is_regulated) {
            if blank(self.regulator_name.as_deref()) {
                return Err(FormError::MissingField("regulator name"));
            }
            if blank(self.regulatory_license_number.as_deref()) {
                return Err(FormError::MissingField("regulatory license number"));
            }
            if self.license_file_id().is_none() {
                return Err(FormError::MissingDocument("the regulatory license copy"));
            }
        }
        if aml_policy_required(self.has_aml_program) && self.aml_file_id().is_none() {
            return Err(FormError::MissingDocument("the AML policy"));
        }
        if self.has_compliance_officer {
            if blank(self.compliance_officer_name.as_deref()) {
                return Err(FormError::MissingField("compliance officer name"));
            }
            match self.compliance_officer_email.as_deref() {
                Some(email) => {
                    ContactEmail::new(email)?;
                }
                None => return Err(FormError::MissingField("compliance officer email")),
            }
        }
        if sanction_details_required(self.has_been_sanctioned)
            && blank(self.sanction_details.as_deref())
        {
            return Err(FormError::MissingField("sanction details"));
        }
        Ok(())
    }

    pub fn payload(&self) -> Map<String, Value> {
        into_object(json!({
            "regulatoryCompliance": {
                "isRegulated": self.is_regulated,
                "regulatorName": self.regulator_name,
                "regulatoryLicenseNumber": self.regulatory_license_number,
                "regulatoryLicenseFileId": self.license_file_id(),
                "hasAmlProgram": self.has_aml_program,
                "amlPolicyFileId": self.aml_file_id(),
                "hasComplianceOfficer": self.has_compliance_officer,
                "complianceOfficerName": self.compliance_officer_name,
                "complianceOfficerEmail": self.compliance_officer_email,
                "hasBeenSanctioned": self.has_been_sanctioned,
                "sanctionDetails": self.sanction_details,
                "operatesInFatfJurisdiction": self.operates_in_fatf_jurisdiction,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalizer::REGULATORY_COMPLIANCE_FIELDS;

    fn form() -> RegulatoryComplianceForm {
        RegulatoryComplianceForm {
            is_regulated: false,
            regulator_name: None,
            regulatory_license_number: None,
            regulatory_license_file_id: None,
            regulatory_license_path: None,
            has_aml_program: false,
            aml_policy_file_id: None,
            aml_policy_path: None,
            has_compliance_officer: false,
            compliance_officer_name: None,
            compliance_officer_email: None,
            has_been_sanctioned: false,
            sanction_details: None,
            operates_in_fatf_jurisdiction: true,
        }
    }

    #[test]
    fn unregulated_entity_needs_no_license() {
        form().validate_requirements().unwrap();
    }

    #[test]
    fn regulated_entity_needs_the_full_regulator_block() {
        let mut form = form();
        form.is_regulated = true;
        assert!(matches!(
            form.validate_requirements(),
            Err(FormError::MissingField("regulator name"))
        ));

        form.regulator_name = Some("Central Bank".to_string());
        form.regulatory_license_number = Some("CB-1201".to_string());
        assert!(matches!(
            form.validate_requirements(),
            Err(FormError::MissingDocument(_))
        ));

        form.regulatory_license_path = Some("/files/33_license.pdf".to_string());
        form.validate_requirements().unwrap();
        assert_eq!(form.license_file_id(), Some(33));
    }

    #[test]
    fn sanctions_need_details() {
        let mut form = form();
        form.has_been_sanctioned = true;
        form.sanction_details = Some("   ".to_string());
        assert!(matches!(
            form.validate_requirements(),
            Err(FormError::MissingField("sanction details"))
        ));
    }

    #[test]
    fn officer_email_is_validated() {
        let mut form = form();
        form.has_compliance_officer = true;
        form.compliance_officer_name = Some("L. Osei".to_string());
        form.compliance_officer_email = Some("not-an-email".to_string());
        assert!(matches!(
            form.validate_requirements(),
            Err(FormError::Invalid(_))
        ));
    }

    #[test]
    fn payload_fields_belong_to_the_normalizer_cluster() {
        let payload = form().payload();
        let section = payload
            .get("regulatoryCompliance")
            .and_then(Value::as_object)
            .unwrap();
        for key in section.keys() {
            assert!(
                REGULATORY_COMPLIANCE_FIELDS.contains(&key.as_str()),
                "{key} is not a recognized regulatory-compliance field"
            );
        }
    }
}
