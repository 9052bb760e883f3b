use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::document::resolve_file_id;
use crate::domain::requirements::bank_proof_required;
use crate::forms::{FormError, into_object};

/// Step 3: the bank-relationship requirement. The proof document is required
/// exactly when an existing relationship is declared; a freshly uploaded id
/// wins over the id embedded in a previously saved path.
#[derive(Debug, Deserialize, Validate)]
pub struct BankRelationshipForm {
    #[serde(default)]
    pub has_existing_relationship: bool,
    #[validate(length(min = 1))]
    pub primary_bank_name: String,
    #[validate(range(min = 1900, max = 2100))]
    pub relationship_since_year: Option<i32>,
    pub relationship_proof_file_id: Option<i64>,
    pub relationship_proof_path: Option<String>,
    #[serde(default)]
    pub maintains_settlement_account: bool,
    pub settlement_bank_name: Option<String>,
}

impl BankRelationshipForm {
    pub fn proof_file_id(&self) -> Option<i64> {
        resolve_file_id(
            self.relationship_proof_file_id,
            self.relationship_proof_path.as_deref(),
        )
    }

    pub fn validate_requirements(&self) -> Result<(), FormError> {
        if bank_proof_required(self.has_existing_relationship) && self.proof_file_id().is_none() {
            return Err(FormError::MissingDocument("the bank relationship proof"));
        }
        if self.maintains_settlement_account
            && self
                .settlement_bank_name
                .as_deref()
                .map(str::trim)
                .is_none_or(str::is_empty)
        {
            return Err(FormError::MissingField("settlement bank name"));
        }
        Ok(())
    }

    pub fn payload(&self) -> Map<String, Value> {
        into_object(json!({
            "bankRelationshipRequirement": {
                "hasExistingRelationship": self.has_existing_relationship,
                "primaryBankName": self.primary_bank_name.trim(),
                "relationshipSinceYear": self.relationship_since_year,
                "relationshipProofFileId": self.proof_file_id(),
                "maintainsSettlementAccount": self.maintains_settlement_account,
                "settlementBankName": self.settlement_bank_name,
            },
        }))
    }
}
