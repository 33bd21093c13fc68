//! Shared Diesel error mapping for the persistence adapters.
//!
//! Diesel exposes a coarse [`DatabaseErrorKind`] instead of the SQLSTATE, so
//! the engine code is rebuilt from the kind, and from the server message for
//! kinds Diesel folds into `Unknown`.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::{StorageFailure, sqlstate};

use super::pool::PoolError;

/// Outcome of a failed Diesel operation, before a repository picks its own
/// error constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// The engine rejected the statement.
    Rejected(StorageFailure),
    /// Anything else: query building, deserialisation, missing rows.
    Query(String),
}

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => connection(message),
    }
}

/// Classify a Diesel error.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            info,
        ) => {
            debug!(message = info.message(), "database connection lost");
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation rejected");
            DieselFailure::Rejected(storage_failure(&kind, info.as_ref()))
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            DieselFailure::Query("database error".to_owned())
        }
    }
}

/// Engine-neutral description of a rejected statement.
pub(crate) fn storage_failure(
    kind: &DatabaseErrorKind,
    info: &(dyn DatabaseErrorInformation + Send + Sync),
) -> StorageFailure {
    let message = info.message().to_owned();
    StorageFailure {
        engine_code: engine_code(kind, &message).map(str::to_owned),
        detail: info.details().map(str::to_owned),
        column: info.column_name().map(str::to_owned),
        constraint: info.constraint_name().map(str::to_owned),
        table: info.table_name().map(str::to_owned),
        message,
    }
}

fn engine_code(kind: &DatabaseErrorKind, message: &str) -> Option<&'static str> {
    match kind {
        DatabaseErrorKind::UniqueViolation => Some(sqlstate::UNIQUE_VIOLATION),
        DatabaseErrorKind::ForeignKeyViolation => Some(sqlstate::FOREIGN_KEY_VIOLATION),
        DatabaseErrorKind::NotNullViolation => Some(sqlstate::NOT_NULL_VIOLATION),
        DatabaseErrorKind::CheckViolation => Some(sqlstate::CHECK_VIOLATION),
        DatabaseErrorKind::SerializationFailure => Some(sqlstate::SERIALIZATION_FAILURE),
        _ => code_from_message(message),
    }
}

/// Recover the SQLSTATE from the server's primary message.
fn code_from_message(message: &str) -> Option<&'static str> {
    let message = message.to_ascii_lowercase();
    if message.starts_with("value too long for type") {
        Some(sqlstate::STRING_DATA_RIGHT_TRUNCATION)
    } else if message.starts_with("deadlock detected") {
        Some(sqlstate::DEADLOCK_DETECTED)
    } else if message.starts_with("could not obtain lock") {
        Some(sqlstate::LOCK_NOT_AVAILABLE)
    } else {
        None
    }
}
