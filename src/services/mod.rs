use thiserror::Error;

use crate::repository::errors::LoadError;

pub mod export;
pub mod filter;
pub mod main;

/// Errors surfaced by the service layer to the HTTP handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("form error: {0}")]
    Form(String),

    #[error(transparent)]
    Load(LoadError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LoadError> for ServiceError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::UnknownAgency(_) => ServiceError::NotFound,
            other => ServiceError::Load(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
