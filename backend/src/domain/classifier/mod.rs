//! Exception classifier: maps any [`Error`] to exactly one failure envelope.
//!
//! Classification order, first match wins:
//!
//! 1. [`Error::Validation`] → 422 with one detail per violation.
//! 2. [`Error::Storage`] → the engine sub-classifier. An engine code that
//!    yields no detail falls through to a 400; a failure without any engine
//!    code falls through to the generic 500.
//! 3. [`Error::NotFound`] → 404.
//! 4. [`Error::AccessDenied`] → 403.
//! 5. [`Error::InvalidArgument`] → 400.
//! 6. [`Error::Unauthenticated`] → 401.
//! 7. Everything else → 500; only development mode exposes the error text.

mod storage;

pub use storage::{EngineErrorClassifier, PostgresErrorClassifier, sqlstate};
#[cfg(test)]
use storage::MockEngineErrorClassifier;

use std::sync::Arc;

use super::{ApiResponse, DeploymentMode, Error, ErrorDetail, StorageFailure};

/// Envelope type produced for failures; failures never carry data.
pub type FailureEnvelope = ApiResponse<()>;

/// Fixed message returned for unclassified errors in production.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please contact support.";

/// Production message for engine failures the sub-classifier does not map.
pub const GENERIC_STORAGE_MESSAGE: &str = "The request could not be saved.";

/// Error code of the detail carrying the full error report in development.
pub const EXCEPTION_CODE: &str = "Exception";

/// Classifier bound to a deployment mode and a storage-engine sub-classifier.
///
/// # Examples
/// ```
/// use clinic_api::domain::{DeploymentMode, Error, ExceptionClassifier};
///
/// let classifier = ExceptionClassifier::new(DeploymentMode::Production);
/// let envelope = classifier.classify(&Error::not_found("Patient 7 not found."));
/// assert_eq!(envelope.status(), 404);
/// ```
#[derive(Clone)]
pub struct ExceptionClassifier {
    mode: DeploymentMode,
    engine: Arc<dyn EngineErrorClassifier>,
}

impl ExceptionClassifier {
    /// Classifier using the PostgreSQL engine mapping.
    pub fn new(mode: DeploymentMode) -> Self {
        Self::with_engine(mode, Arc::new(PostgresErrorClassifier))
    }

    /// Classifier using a custom engine mapping.
    pub fn with_engine(mode: DeploymentMode, engine: Arc<dyn EngineErrorClassifier>) -> Self {
        Self { mode, engine }
    }

    /// Deployment mode this classifier renders for.
    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Produce the failure envelope for `error`.
    pub fn classify(&self, error: &Error) -> FailureEnvelope {
        match error {
            Error::Validation(violations) => ApiResponse::validation_failed(
                violations
                    .iter()
                    .map(|v| ErrorDetail::with_target(v.code(), v.message(), v.property()))
                    .collect(),
            ),
            Error::Storage(failure) => self.classify_storage(error, failure),
            Error::NotFound(message) => ApiResponse::not_found(Some(message.clone())),
            Error::AccessDenied(message) => ApiResponse::forbidden(Some(message.clone())),
            Error::InvalidArgument(message) => ApiResponse::bad_request(message.as_str(), None),
            Error::Unauthenticated(message) => ApiResponse::unauthorized(Some(message.clone())),
            Error::Unclassified { .. } => self.generic(error),
        }
    }

    fn classify_storage(&self, error: &Error, failure: &StorageFailure) -> FailureEnvelope {
        let Some(code) = failure.engine_code.as_deref() else {
            return self.generic(error);
        };
        match self.engine.classify(code, failure, self.mode) {
            Some(detail) => ApiResponse::validation_failed(vec![detail]),
            None if self.mode.is_development() => {
                ApiResponse::bad_request(failure.full_message(), None)
            }
            None => ApiResponse::bad_request(GENERIC_STORAGE_MESSAGE, None),
        }
    }

    fn generic(&self, error: &Error) -> FailureEnvelope {
        if self.mode.is_development() {
            ApiResponse::server_error(
                error.to_string(),
                Some(vec![ErrorDetail::new(EXCEPTION_CODE, error.trace())]),
            )
        } else {
            ApiResponse::server_error(GENERIC_ERROR_MESSAGE, None)
        }
    }
}

impl std::fmt::Debug for ExceptionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionClassifier")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
