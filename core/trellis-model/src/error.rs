//! Error types for the object model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while declaring schemas or building and reading entities.
///
/// The model never recovers from these locally: a failed coercion or wrap
/// always surfaces to the caller rather than leaving a half-populated entity.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed schema declaration, detected when the schema is built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No wrap rule could turn the input into the target type.
    #[error("{target} can not wrap {actual}")]
    Unwrappable { target: String, actual: String },

    /// A conversion selector rejected its input.
    #[error("cannot coerce `{attribute}` via {target}.{selector}: {reason}")]
    Coercion {
        attribute: String,
        target: String,
        selector: String,
        reason: String,
    },

    /// The attribute is not declared on the entity type.
    #[error("unknown attribute `{attribute}` for {entity}")]
    UnknownAttribute { entity: String, attribute: String },

    /// `Entity::is` called on an attribute declared without `predicate`.
    #[error("`{attribute}` is not a predicate attribute of {entity}")]
    NotPredicate { entity: String, attribute: String },

    /// A collaborator operation that has no default implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn unwrappable(target: &str, actual: impl Into<String>) -> Self {
        Self::Unwrappable {
            target: target.to_string(),
            actual: actual.into(),
        }
    }

    /// Builds a conversion failure for use inside custom selectors.
    pub fn conversion(reason: impl Into<String>) -> Self {
        Self::Coercion {
            attribute: String::new(),
            target: String::new(),
            selector: String::new(),
            reason: reason.into(),
        }
    }
}
