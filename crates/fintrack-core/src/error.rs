use fintrack_domain::{DraftError, TransactionId};
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Sign-in required")]
    AuthRequired,
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Remote write failed: {0}")]
    RemoteWrite(#[source] RemoteError),
    #[error("Remote read failed: {0}")]
    RemoteRead(#[source] RemoteError),
}

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

impl From<DraftError> for CoreError {
    fn from(err: DraftError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// Failures reported by a remote collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}
