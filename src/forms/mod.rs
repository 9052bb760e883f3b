//! Form structs for every wizard section and the admin dialogs.
//!
//! Each form carries the declarative `validator` rules for its fields plus a
//! `validate_requirements` pass for the conditional rules, which go through
//! [`crate::domain::requirements`] so validation and payload assembly can
//! never disagree about what is mandatory.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

pub mod applicability;
pub mod bank;
pub mod company;
pub mod consideration;
pub mod data_protection;
pub mod declaration;
pub mod documents;
pub mod financial;
pub mod regulatory;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("invalid value: {0}")]
    Invalid(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("a document is required for {0}")]
    MissingDocument(&'static str),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        FormError::Invalid(err.to_string())
    }
}

/// Unwraps the object a `json!` literal is known to produce.
pub(crate) fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
