//! Domain error taxonomy.
//!
//! Every failure raised by application logic surfaces as one of these
//! variants. The exception classifier turns them into response envelopes at
//! the edge of the pipeline; nothing in between inspects or rewrites them.

use std::error::Error as StdError;
use std::fmt::Write as _;

/// One field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    property: String,
    code: String,
    message: String,
}

impl FieldViolation {
    /// Record that `property` broke the rule identified by `code`.
    pub fn new(
        property: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Path of the offending field.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Rule identifier, e.g. `NotEmpty` or `MaximumLength`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Engine-neutral description of a failed storage write.
///
/// `engine_code` is the storage engine's own condition identifier (a
/// PostgreSQL SQLSTATE for the shipped adapters). A failure without one is
/// never sub-classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageFailure {
    /// Engine condition code.
    pub engine_code: Option<String>,
    /// Primary engine message.
    pub message: String,
    /// Secondary engine detail, e.g. `Key (col)=(value) already exists.`
    pub detail: Option<String>,
    /// Column reported by the engine.
    pub column: Option<String>,
    /// Constraint reported by the engine.
    pub constraint: Option<String>,
    /// Table reported by the engine.
    pub table: Option<String>,
}

impl StorageFailure {
    /// Failure carrying an engine code and message.
    pub fn new(engine_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            engine_code: Some(engine_code.into()),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Failure the engine did not tag with a recognisable code.
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Engine message followed by its detail, when present.
    pub fn full_message(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} {detail}", self.message),
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.engine_code {
            Some(code) => write!(f, "[{code}] {}", self.full_message()),
            None => write!(f, "{}", self.full_message()),
        }
    }
}

/// Application error surfaced to the exception classifier.
///
/// # Examples
/// ```
/// use clinic_api::domain::Error;
///
/// let err = Error::not_found("Patient 7 not found.");
/// assert_eq!(err.kind(), "NotFound");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more field-level rule violations.
    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),
    /// A storage-layer write was rejected.
    #[error("storage update failed: {0}")]
    Storage(StorageFailure),
    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The caller may not perform the operation.
    #[error("{0}")]
    AccessDenied(String),
    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthenticated(String),
    /// An argument or domain rule was breached.
    #[error("{0}")]
    InvalidArgument(String),
    /// Anything the classifier has no dedicated mapping for.
    #[error("{message}")]
    Unclassified {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Convenience constructor for [`Error::AccessDenied`].
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    /// Convenience constructor for [`Error::Unauthenticated`].
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// Convenience constructor for [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Unclassified failure without an underlying cause.
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
            source: None,
        }
    }

    /// Unclassified failure wrapping `source`.
    pub fn unexpected<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Unclassified {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Variant name, used as the short error type in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation",
            Self::Storage(_) => "Storage",
            Self::NotFound(_) => "NotFound",
            Self::AccessDenied(_) => "AccessDenied",
            Self::Unauthenticated(_) => "Unauthenticated",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::Unclassified { .. } => "Unclassified",
        }
    }

    /// Fully qualified error type, e.g. `clinic_api::domain::error::Error::Storage`.
    pub fn type_name(&self) -> String {
        format!("{}::{}", std::any::type_name::<Self>(), self.kind())
    }

    /// The error followed by its chain of causes, one per line.
    pub fn trace(&self) -> String {
        error_chain(self)
    }
}

/// Render `error` and every `source()` below it.
pub(crate) fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut cause = error.source();
    while let Some(inner) = cause {
        // Writing into a String cannot fail.
        let _ = write!(rendered, "\nCaused by: {inner}");
        cause = inner.source();
    }
    rendered
}
