//! HTTP adapter mapping for domain errors.
//!
//! Purpose: let handlers return [`Error`] directly. Outside the
//! [`crate::middleware::ErrorEnvelope`] middleware the response is rendered
//! with production verbosity; the middleware re-renders it with the
//! configured deployment mode.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use super::envelope::render;
use crate::domain::{DeploymentMode, Error, ExceptionClassifier, FailureEnvelope, sqlstate};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn production_envelope(error: &Error) -> FailureEnvelope {
    ExceptionClassifier::new(DeploymentMode::Production).classify(error)
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(failure) => match failure.engine_code.as_deref() {
                None => StatusCode::INTERNAL_SERVER_ERROR,
                Some(code) if sqlstate::is_mapped(code) => StatusCode::UNPROCESSABLE_ENTITY,
                Some(_) => StatusCode::BAD_REQUEST,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Unclassified { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        render(&production_envelope(self))
    }
}
