use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::types::{ConsiderationMessage, TypeConstraintError};
use crate::forms::applicability::ApplicabilityForm;

/// The special-consideration side dialog: the step-1 answers again, plus the
/// applicant's message to the reviewing admin.
#[derive(Debug, Deserialize, Validate)]
pub struct SpecialConsiderationForm {
    #[validate(length(min = 1))]
    pub membership_type: String,
    pub is_licensed_entity: bool,
    pub operates_in_banking_sector: bool,
    pub has_physical_presence: bool,
    pub accepts_code_of_conduct: bool,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

impl SpecialConsiderationForm {
    fn applicability(&self) -> ApplicabilityForm {
        ApplicabilityForm {
            membership_type: self.membership_type.clone(),
            is_licensed_entity: self.is_licensed_entity,
            operates_in_banking_sector: self.operates_in_banking_sector,
            has_physical_presence: self.has_physical_presence,
            accepts_code_of_conduct: self.accepts_code_of_conduct,
        }
    }

    /// The same payload a regular step-1 submit produces.
    pub fn payload(&self) -> Map<String, Value> {
        self.applicability().payload()
    }

    /// The sanitized message persisted alongside the pending request.
    pub fn consideration_message(&self) -> Result<ConsiderationMessage, TypeConstraintError> {
        ConsiderationMessage::new(&self.message)
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Deserialize)]
pub struct ConsiderationDecisionForm {
    /// `approve` or `reject`.
    pub action: String,
}

impl ConsiderationDecisionForm {
    pub fn approve(&self) -> bool {
        self.action.eq_ignore_ascii_case("approve")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_payload_matches_the_step_one_shape() {
        let form = SpecialConsiderationForm {
            membership_type: "Associate".to_string(),
            is_licensed_entity: true,
            operates_in_banking_sector: false,
            has_physical_presence: true,
            accepts_code_of_conduct: true,
            message: "Our banking license application is pending.".to_string(),
        };

        let payload = form.payload();
        assert!(payload.contains_key("applicability"));
        assert!(payload.contains_key("application"));
        assert_eq!(
            form.consideration_message().unwrap().as_str(),
            "Our banking license application is pending."
        );
    }

    #[test]
    fn decision_parses_case_insensitively() {
        assert!(
            ConsiderationDecisionForm {
                action: "Approve".to_string()
            }
            .approve()
        );
        assert!(
            !ConsiderationDecisionForm {
                action: "reject".to_string()
            }
            .approve()
        );
    }
}
