//! Uniform success/failure envelope wrapping every API response.
//!
//! Envelopes are immutable values produced by named factories. Each factory
//! stamps the ambient [`CorrelationId`] and the capture time so handlers never
//! supply either. The serialised field set is identical for every factory;
//! unused optional fields are emitted as `null`.
//!
//! ## Invariants
//! - `success == true` implies `errors` is absent.
//! - `success == false` implies `data` is absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CorrelationId;

/// Message attached to every validation failure.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed.";

const CREATED_MESSAGE: &str = "Resource created.";
const UNAUTHORIZED_MESSAGE: &str = "Unauthorized.";
const FORBIDDEN_MESSAGE: &str = "Forbidden.";
const NOT_FOUND_MESSAGE: &str = "Resource not found.";

/// One structured error inside a failure envelope.
///
/// `target` names the offending field or column when it is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    code: String,
    message: String,
    #[serde(default)]
    target: Option<String>,
}

impl ErrorDetail {
    /// Build a detail without a target.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            target: None,
        }
    }

    /// Build a detail naming the offending field.
    pub fn with_target(
        code: impl Into<String>,
        message: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            target: Some(target.into()),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Field or column the error refers to.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Response envelope.
///
/// # Examples
/// ```
/// use clinic_api::domain::ApiResponse;
///
/// let envelope = ApiResponse::ok(vec![1, 2, 3], None);
/// assert!(envelope.is_success());
/// assert_eq!(envelope.status(), 200);
/// assert!(envelope.errors().is_none());
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    success: bool,
    status: u16,
    message: Option<String>,
    data: Option<T>,
    errors: Option<Vec<ErrorDetail>>,
    correlation_id: CorrelationId,
    timestamp: DateTime<Utc>,
    #[serde(skip)]
    location: Option<String>,
}

impl<T> ApiResponse<T> {
    fn build(
        success: bool,
        status: u16,
        message: Option<String>,
        data: Option<T>,
        errors: Option<Vec<ErrorDetail>>,
    ) -> Self {
        Self {
            success,
            status,
            message,
            data,
            errors,
            correlation_id: CorrelationId::current_or_generate(),
            timestamp: Utc::now(),
            location: None,
        }
    }

    fn failure(status: u16, message: String, errors: Option<Vec<ErrorDetail>>) -> Self {
        Self::build(false, status, Some(message), None, errors)
    }

    /// `200 OK` carrying `data`.
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self::build(true, 200, message, Some(data), None)
    }

    /// `201 Created` carrying `data`; the HTTP layer turns `location` into a
    /// `Location` header.
    pub fn created(
        data: T,
        location: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        let message = message.unwrap_or_else(|| CREATED_MESSAGE.to_owned());
        let mut envelope = Self::build(true, 201, Some(message), Some(data), None);
        envelope.location = Some(location.into());
        envelope
    }

    /// `204 No Content`.
    pub fn no_content() -> Self {
        Self::build(true, 204, None, None, None)
    }

    /// `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>, errors: Option<Vec<ErrorDetail>>) -> Self {
        Self::failure(400, message.into(), errors)
    }

    /// `401 Unauthorized`.
    pub fn unauthorized(message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| UNAUTHORIZED_MESSAGE.to_owned());
        Self::failure(401, message, None)
    }

    /// `403 Forbidden`.
    pub fn forbidden(message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| FORBIDDEN_MESSAGE.to_owned());
        Self::failure(403, message, None)
    }

    /// `404 Not Found`.
    pub fn not_found(message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| NOT_FOUND_MESSAGE.to_owned());
        Self::failure(404, message, None)
    }

    /// `422 Unprocessable Entity` with one detail per violation. An empty
    /// list still produces a failure with an empty `errors` array.
    pub fn validation_failed(errors: Vec<ErrorDetail>) -> Self {
        Self::failure(422, VALIDATION_FAILED_MESSAGE.to_owned(), Some(errors))
    }

    /// `500 Internal Server Error`.
    pub fn server_error(message: impl Into<String>, errors: Option<Vec<ErrorDetail>>) -> Self {
        Self::failure(500, message.into(), errors)
    }

    /// Whether the envelope reports success.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// HTTP status the envelope was built for.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Optional human-readable message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Payload of a successful response.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Structured errors of a failed response.
    pub fn errors(&self) -> Option<&[ErrorDetail]> {
        self.errors.as_deref()
    }

    /// Correlation identifier stamped at construction.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Capture time in UTC.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Location of a newly created resource.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

#[cfg(test)]
mod tests;
