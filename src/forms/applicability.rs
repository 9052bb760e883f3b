use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::requirements::special_consideration_required;
use crate::forms::into_object;

/// Step 1: the eligibility questionnaire plus the membership tier applied
/// for. Every answer is a hard yes/no; any "no" routes through the
/// special-consideration dialog.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplicabilityForm {
    #[validate(length(min = 1))]
    pub membership_type: String,
    pub is_licensed_entity: bool,
    pub operates_in_banking_sector: bool,
    pub has_physical_presence: bool,
    pub accepts_code_of_conduct: bool,
}

impl ApplicabilityForm {
    pub fn answers(&self) -> [bool; 4] {
        [
            self.is_licensed_entity,
            self.operates_in_banking_sector,
            self.has_physical_presence,
            self.accepts_code_of_conduct,
        ]
    }

    /// Same predicate the save path enforces: any "no" answer needs an
    /// approved exception request.
    pub fn requires_special_consideration(&self) -> bool {
        special_consideration_required(&self.answers())
    }

    pub fn payload(&self) -> Map<String, Value> {
        into_object(json!({
            "applicability": {
                "isLicensedEntity": self.is_licensed_entity,
                "operatesInBankingSector": self.operates_in_banking_sector,
                "hasPhysicalPresence": self.has_physical_presence,
                "acceptsCodeOfConduct": self.accepts_code_of_conduct,
            },
            "application": {
                "membershipType": self.membership_type,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(all_yes: bool) -> ApplicabilityForm {
        ApplicabilityForm {
            membership_type: "Principal".to_string(),
            is_licensed_entity: true,
            operates_in_banking_sector: all_yes,
            has_physical_presence: true,
            accepts_code_of_conduct: true,
        }
    }

    #[test]
    fn all_yes_needs_no_consideration() {
        assert!(!form(true).requires_special_consideration());
        assert!(form(false).requires_special_consideration());
    }

    #[test]
    fn payload_nests_answers_and_membership_type() {
        let payload = form(true).payload();
        assert_eq!(
            payload
                .get("applicability")
                .and_then(|answers| answers.get("operatesInBankingSector")),
            Some(&serde_json::json!(true))
        );
        assert_eq!(
            payload
                .get("application")
                .and_then(|fields| fields.get("membershipType")),
            Some(&serde_json::json!("Principal"))
        );
    }
}
