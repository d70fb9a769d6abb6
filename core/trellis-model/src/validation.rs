use crate::entity::{Entity, Serializable};
use crate::value::ValueMap;
use std::collections::BTreeMap;

/// Field name → error messages.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// Outcome of running a [`Validator`] over raw params.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    success: bool,
    errors: ValidationErrors,
    sanitized_params: ValueMap,
}

impl ValidationResult {
    /// A passing result carrying the sanitized params.
    pub fn success(sanitized_params: ValueMap) -> Self {
        Self {
            success: true,
            errors: ValidationErrors::new(),
            sanitized_params,
        }
    }

    /// A failing result with no errors yet; add them with [`Self::with_error`].
    pub fn failure() -> Self {
        Self::default()
    }

    /// Adds an error message for `field` and marks the result as failed.
    #[must_use]
    pub fn with_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.success = false;
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.success
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn sanitized_params(&self) -> &ValueMap {
        &self.sanitized_params
    }

    /// The sanitized params when valid, an empty map otherwise.
    pub fn valid_params(&self) -> ValueMap {
        if self.success {
            self.sanitized_params.clone()
        } else {
            ValueMap::new()
        }
    }
}

/// Pluggable validation collaborator.
///
/// The model never validates by itself; it only delegates to this trait.
/// Closures of the right shape are validators.
pub trait Validator: Send + Sync {
    fn validate(&self, params: &ValueMap) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&ValueMap) -> ValidationResult + Send + Sync,
{
    fn validate(&self, params: &ValueMap) -> ValidationResult {
        self(params)
    }
}

/// Validation accessors for anything that can hand its params to a
/// validator.
///
/// Without a validator everything is vacuously valid. Nothing is memoized:
/// every accessor runs the validator over the current params, so results
/// follow later mutation. Callers needing several views of one run should
/// hold on to [`Validateable::validation`].
pub trait Validateable {
    fn params(&self) -> ValueMap;

    fn validator(&self) -> Option<&dyn Validator>;

    /// Runs the validator once. `None` without a validator.
    fn validation(&self) -> Option<ValidationResult> {
        self.validator().map(|validator| validator.validate(&self.params()))
    }

    fn is_valid(&self) -> bool {
        self.validation()
            .is_none_or(|result| result.is_success())
    }

    fn validation_errors(&self) -> ValidationErrors {
        self.validation()
            .map(|result| result.errors)
            .unwrap_or_default()
    }

    /// Sanitized params if valid, empty if invalid, raw params if there is
    /// no validator.
    fn valid_params(&self) -> ValueMap {
        match self.validation() {
            Some(result) => result.valid_params(),
            None => self.params(),
        }
    }
}

impl Validateable for Entity {
    fn params(&self) -> ValueMap {
        self.to_map()
    }

    fn validator(&self) -> Option<&dyn Validator> {
        self.schema().validator()
    }
}
