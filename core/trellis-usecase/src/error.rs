//! Error types for use-case invocation.

use thiserror::Error;
use trellis_model::ModelError;

/// Result type for use-case operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// An expected, recoverable failure of a use case.
///
/// Returned from `execute` when the operation could not complete for a
/// business reason. [`UseCase::call`](crate::UseCase::call) turns it into
/// `Ok(None)`; every other error is a defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProcessingError {
    message: String,
}

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by a use-case invocation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Recoverable business failure.
    #[error("processing failed: {0}")]
    Processing(#[from] ProcessingError),

    /// The use case never defined its body.
    #[error("abstract method `{0}` is not implemented")]
    AbstractMethod(&'static str),

    /// The object model rejected input or a declaration.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Any other failure raised while executing.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    /// Only `Processing` is recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Processing(_))
    }
}
