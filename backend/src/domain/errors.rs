use thiserror::Error;

/// Errors surfaced by the studio services
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl StudioError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StudioError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StudioError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        StudioError::Forbidden(message.into())
    }
}

pub type StudioResult<T> = Result<T, StudioError>;
