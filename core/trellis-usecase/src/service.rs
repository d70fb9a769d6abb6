//! The use-case trait and its invocation state tracker.

use crate::error::{ServiceError, ServiceResult};
use std::any::type_name;
use tracing::debug;

/// A single application operation.
///
/// Implementors provide [`execute`](UseCase::execute). Callers choose between
/// the tolerant [`call`](UseCase::call), which maps a recoverable
/// [`ProcessingError`](crate::ProcessingError) to `None`, and the strict
/// [`call_strict`](UseCase::call_strict), which propagates everything.
pub trait UseCase {
    type Output;

    /// The body of the operation.
    fn execute(&mut self) -> ServiceResult<Self::Output> {
        Err(ServiceError::AbstractMethod("execute"))
    }

    fn call(&mut self) -> ServiceResult<Option<Self::Output>> {
        let outcome = self.execute();
        log_outcome::<Self, _>(&outcome);
        recover(outcome)
    }

    fn call_strict(&mut self) -> ServiceResult<Self::Output> {
        let outcome = self.execute();
        log_outcome::<Self, _>(&outcome);
        outcome
    }

    /// Builds a default instance and calls it.
    fn run() -> ServiceResult<Option<Self::Output>>
    where
        Self: Default + Sized,
    {
        Self::default().call()
    }

    /// Builds a default instance and calls it strictly.
    fn run_strict() -> ServiceResult<Self::Output>
    where
        Self: Default + Sized,
    {
        Self::default().call_strict()
    }
}

fn recover<T>(outcome: ServiceResult<T>) -> ServiceResult<Option<T>> {
    match outcome {
        Ok(output) => Ok(Some(output)),
        Err(ServiceError::Processing(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn log_outcome<U: ?Sized, T>(outcome: &ServiceResult<T>) {
    match outcome {
        Ok(_) => debug!(use_case = type_name::<U>(), "use case succeeded"),
        Err(err) if err.is_recoverable() => {
            debug!(use_case = type_name::<U>(), error = %err, "use case failed (recoverable)")
        }
        Err(err) => debug!(use_case = type_name::<U>(), error = %err, "use case failed"),
    }
}

/// Lifecycle of an [`Invocation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    Idle,
    /// Transient: held only while `execute` runs. An invocation still in
    /// this state after a call means `execute` unwound.
    Running,
    Succeeded,
    FailedRecoverable,
    FailedFatal,
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Running)
    }

    fn after<T>(outcome: &ServiceResult<T>) -> Self {
        match outcome {
            Ok(_) => Self::Succeeded,
            Err(err) if err.is_recoverable() => Self::FailedRecoverable,
            Err(_) => Self::FailedFatal,
        }
    }
}

/// Wraps a use case and records the terminal state of its last call.
#[derive(Debug)]
pub struct Invocation<U> {
    use_case: U,
    state: CallState,
}

impl<U: UseCase> Invocation<U> {
    pub fn new(use_case: U) -> Self {
        Self {
            use_case,
            state: CallState::Idle,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn use_case(&self) -> &U {
        &self.use_case
    }

    pub fn call(&mut self) -> ServiceResult<Option<U::Output>> {
        let outcome = self.execute();
        recover(outcome)
    }

    pub fn call_strict(&mut self) -> ServiceResult<U::Output> {
        self.execute()
    }

    pub fn into_inner(self) -> U {
        self.use_case
    }

    fn execute(&mut self) -> ServiceResult<U::Output> {
        self.state = CallState::Running;
        let outcome = self.use_case.execute();
        log_outcome::<U, _>(&outcome);
        self.state = CallState::after(&outcome);
        outcome
    }
}
