//! Storage-engine error sub-classifier.
//!
//! Engine message formats differ between backends and versions, so the
//! pattern matching lives behind [`EngineErrorClassifier`] and can be
//! swapped per backend without touching the rest of the classifier.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{DeploymentMode, ErrorDetail, StorageFailure};

/// PostgreSQL SQLSTATE codes recognised by [`PostgresErrorClassifier`].
pub mod sqlstate {
    /// `unique_violation`
    pub const UNIQUE_VIOLATION: &str = "23505";
    /// `not_null_violation`
    pub const NOT_NULL_VIOLATION: &str = "23502";
    /// `string_data_right_truncation`
    pub const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
    /// `foreign_key_violation`
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    /// `check_violation`
    pub const CHECK_VIOLATION: &str = "23514";
    /// `deadlock_detected`
    pub const DEADLOCK_DETECTED: &str = "40P01";
    /// `lock_not_available`
    pub const LOCK_NOT_AVAILABLE: &str = "55P03";
    /// `serialization_failure`
    pub const SERIALIZATION_FAILURE: &str = "40001";

    /// Whether `code` maps to a field-level detail in every deployment mode.
    pub fn is_mapped(code: &str) -> bool {
        matches!(
            code,
            UNIQUE_VIOLATION
                | NOT_NULL_VIOLATION
                | STRING_DATA_RIGHT_TRUNCATION
                | FOREIGN_KEY_VIOLATION
                | CHECK_VIOLATION
                | DEADLOCK_DETECTED
                | LOCK_NOT_AVAILABLE
                | SERIALIZATION_FAILURE
        )
    }
}

/// Maps one engine condition code to a user-facing error detail.
#[cfg_attr(test, mockall::automock)]
pub trait EngineErrorClassifier: Send + Sync {
    /// Classify `failure`, tagged by the engine with `code`.
    ///
    /// Returns `None` when the code has no user-facing mapping in `mode`.
    fn classify(
        &self,
        code: &str,
        failure: &StorageFailure,
        mode: DeploymentMode,
    ) -> Option<ErrorDetail>;
}

/// Sub-classifier for PostgreSQL SQLSTATE codes and message formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresErrorClassifier;

const DUPLICATE_MESSAGE: &str = "A record with the same unique value already exists.";
const REQUIRED_MESSAGE: &str = "A required value is missing.";
const MAX_LENGTH_MESSAGE: &str = "A value exceeds the maximum allowed length.";
const FOREIGN_KEY_MESSAGE: &str = "The referenced record does not exist or is still in use.";
const CONSTRAINT_MESSAGE: &str = "A value violates a data constraint.";
const CONCURRENCY_MESSAGE: &str =
    "The record was modified or locked by another operation. Please retry.";

impl EngineErrorClassifier for PostgresErrorClassifier {
    fn classify(
        &self,
        code: &str,
        failure: &StorageFailure,
        mode: DeploymentMode,
    ) -> Option<ErrorDetail> {
        let dev = mode.is_development();
        let text = failure.full_message();
        match code {
            sqlstate::UNIQUE_VIOLATION => {
                let key = key_columns(&text);
                let column = key
                    .as_ref()
                    .map(|(columns, _)| columns.clone())
                    .or_else(|| failure.column.as_deref().map(pascal_case))
                    .or_else(|| guess_from_constraint(failure))
                    .unwrap_or_else(|| "Unique field".to_owned());
                let message = if dev {
                    match key.as_ref().map(|(_, value)| value.as_str()) {
                        Some(value) => format!("Duplicate value '{value}' for {column}."),
                        None => format!("Duplicate value for {column}."),
                    }
                } else {
                    DUPLICATE_MESSAGE.to_owned()
                };
                Some(ErrorDetail::with_target("Duplicate", message, column))
            }
            sqlstate::NOT_NULL_VIOLATION => {
                let column = named_column(failure, &text).unwrap_or_else(|| "Field".to_owned());
                let message = if dev {
                    format!("{column} is required.")
                } else {
                    REQUIRED_MESSAGE.to_owned()
                };
                Some(ErrorDetail::with_target("Required", message, column))
            }
            sqlstate::STRING_DATA_RIGHT_TRUNCATION => {
                let column = named_column(failure, &text).unwrap_or_else(|| "Field".to_owned());
                let message = if dev {
                    format!("{column} is too long: {}", failure.message)
                } else {
                    MAX_LENGTH_MESSAGE.to_owned()
                };
                Some(ErrorDetail::with_target("MaxLength", message, column))
            }
            sqlstate::FOREIGN_KEY_VIOLATION => {
                let column = key_columns(&text)
                    .map(|(columns, _)| columns)
                    .or_else(|| named_column(failure, &text))
                    .unwrap_or_else(|| "ForeignKey".to_owned());
                let message = if dev {
                    let table = referenced_table(&text)
                        .or_else(|| failure.table.clone())
                        .unwrap_or_else(|| "unknown".to_owned());
                    format!("{column} references a missing or dependent row in table '{table}'.")
                } else {
                    FOREIGN_KEY_MESSAGE.to_owned()
                };
                Some(ErrorDetail::with_target("ForeignKey", message, column))
            }
            sqlstate::CHECK_VIOLATION => {
                let message = if dev {
                    let constraint = failure.constraint.as_deref().unwrap_or("unknown");
                    format!("Check constraint '{constraint}' was violated.")
                } else {
                    CONSTRAINT_MESSAGE.to_owned()
                };
                Some(ErrorDetail::new("Constraint", message))
            }
            sqlstate::DEADLOCK_DETECTED
            | sqlstate::LOCK_NOT_AVAILABLE
            | sqlstate::SERIALIZATION_FAILURE => {
                let message = if dev {
                    format!("Concurrency conflict (engine code {code}): {}", failure.message)
                } else {
                    CONCURRENCY_MESSAGE.to_owned()
                };
                Some(ErrorDetail::new("Concurrency", message))
            }
            other if dev => Some(ErrorDetail::new(format!("Sql{other}"), text)),
            _ => None,
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|error| panic!("engine message regex failed to compile: {error}"))
}

fn key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"Key \((?P<columns>[^)]+)\)=\((?P<value>.*?)\)"))
}

fn column_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r#"column "(?P<column>[^"]+)""#))
}

fn table_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r#"(?:present in|referenced from) table "(?P<table>[^"]+)""#))
}

/// Columns and offending value from a `Key (col)=(value)` fragment.
fn key_columns(text: &str) -> Option<(String, String)> {
    let captures = key_pattern().captures(text)?;
    let columns = captures
        .name("columns")?
        .as_str()
        .split(',')
        .map(|column| pascal_case(column.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let value = captures
        .name("value")
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default();
    Some((columns, value))
}

/// Column reported by the engine, else one quoted in the message.
fn named_column(failure: &StorageFailure, text: &str) -> Option<String> {
    failure.column.as_deref().map(pascal_case).or_else(|| {
        column_pattern()
            .captures(text)
            .and_then(|c| c.name("column"))
            .map(|m| pascal_case(m.as_str()))
    })
}

fn referenced_table(text: &str) -> Option<String> {
    table_pattern()
        .captures(text)
        .and_then(|c| c.name("table"))
        .map(|m| m.as_str().to_owned())
}

/// Guess the column from a unique constraint name such as
/// `patients_medical_record_number_key` or `UQ_Patients_Email`.
fn guess_from_constraint(failure: &StorageFailure) -> Option<String> {
    let constraint = failure.constraint.as_deref()?.to_ascii_lowercase();
    let mut stem = constraint.as_str();
    for prefix in ["uq_", "ux_", "ak_", "ix_"] {
        if let Some(rest) = stem.strip_prefix(prefix) {
            stem = rest;
            break;
        }
    }
    if let Some(table) = failure.table.as_deref() {
        let table = format!("{}_", table.to_ascii_lowercase());
        if let Some(rest) = stem.strip_prefix(table.as_str()) {
            stem = rest;
        }
    }
    for suffix in ["_key", "_pkey", "_idx", "_unique"] {
        if let Some(rest) = stem.strip_suffix(suffix) {
            stem = rest;
            break;
        }
    }
    let stem = stem.trim_matches('_');
    // Generated names like `uq__patients__8e549ed0` carry no column.
    if stem.is_empty() || stem.contains("__") {
        return None;
    }
    Some(pascal_case(stem))
}

/// `medical_record_number` → `MedicalRecordNumber`; already-cased names and
/// quoted identifiers keep their inner casing.
pub(crate) fn pascal_case(identifier: &str) -> String {
    identifier
        .trim_matches('"')
        .split(['_', ' '])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect()
}
