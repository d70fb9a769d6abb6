//! Use-case invocation contract for Trellis.
//!
//! A use case distinguishes expected business failures
//! ([`ServiceError::Processing`]) from defects. The tolerant
//! [`UseCase::call`] swallows the former; [`UseCase::call_strict`] surfaces
//! both.

mod error;
mod service;

pub use error::{ProcessingError, ServiceError, ServiceResult};
pub use service::{CallState, Invocation, UseCase};
