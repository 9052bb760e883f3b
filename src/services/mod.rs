use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod applications;
pub mod wizard;

/// Failures surfaced by the use-case layer. Repository errors pass through
/// transparently so callers can still inspect the original failure instead of
/// a re-worded copy.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A save for this application is already in flight.
    #[error("a save is already in progress")]
    SaveInProgress,

    /// Saving is gated while uploads for the active step are outstanding.
    #[error("{0} upload(s) still pending")]
    UploadsPending(usize),

    /// A "no" eligibility answer needs an approved exception request first.
    #[error("special consideration approval is required to proceed")]
    SpecialConsiderationRequired,

    #[error("the application has already been submitted")]
    AlreadySubmitted,

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
