//! Domain primitives, the response envelope and the error classifier.
//!
//! Purpose: keep everything that decides *what* a response or log row looks
//! like free of HTTP and database types, so the middleware and adapters only
//! gather facts and hand them over.
//!
//! Public surface:
//! - `CorrelationId`, `RequestId`: per-request identifiers.
//! - `ApiResponse`, `ErrorDetail`: the response envelope.
//! - `Error`: the error taxonomy every handler returns.
//! - `ExceptionClassifier`: maps an `Error` to a failure envelope.
//! - `RequestLogEntry`: one bounded, redacted log row per request.

pub mod classifier;
pub mod correlation_id;
pub mod deployment;
pub mod envelope;
pub mod error;
pub mod patient;
pub mod ports;
pub mod request_log;

pub use self::classifier::{
    EXCEPTION_CODE, EngineErrorClassifier, ExceptionClassifier, FailureEnvelope,
    GENERIC_ERROR_MESSAGE, PostgresErrorClassifier, sqlstate,
};
pub use self::correlation_id::{CORRELATION_ID_HEADER, CorrelationId, REQUEST_ID_HEADER, RequestId};
pub use self::deployment::{DeploymentMode, UnknownDeploymentMode};
pub use self::envelope::{ApiResponse, ErrorDetail, VALIDATION_FAILED_MESSAGE};
pub use self::error::{Error, FieldViolation, StorageFailure};
pub use self::request_log::{ErrorReport, IdentityClaims, RequestLogEntry};

