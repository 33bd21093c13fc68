//! Port for persisting request log rows.
//!
//! The recorder writes exactly one row per request through
//! [`RequestLogRepository::save`]. A row is inserted as a unit, so adapters
//! never expose a staged append followed by a separate commit.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::RequestLogEntry;

use super::define_port_error;

define_port_error! {
    /// Errors raised by request log adapters.
    pub enum RequestLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "request log connection failed: {message}",
        /// The insert was rejected or failed during execution.
        Query { message: String } => "request log insert failed: {message}",
    }
}

/// Sink for request log rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    /// Persist one row.
    async fn save(&self, entry: &RequestLogEntry) -> Result<(), RequestLogRepositoryError>;
}

/// Fixture sink that discards every row.
#[derive(Debug, Default)]
pub struct FixtureRequestLogRepository;

#[async_trait]
impl RequestLogRepository for FixtureRequestLogRepository {
    async fn save(&self, _entry: &RequestLogEntry) -> Result<(), RequestLogRepositoryError> {
        Ok(())
    }
}

/// In-memory sink keeping every saved row so tests can inspect them.
#[derive(Debug, Default)]
pub struct RecordingRequestLogRepository {
    entries: Mutex<Vec<RequestLogEntry>>,
}

impl RecordingRequestLogRepository {
    /// Snapshot of the rows saved so far.
    pub fn entries(&self) -> Vec<RequestLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl RequestLogRepository for RecordingRequestLogRepository {
    async fn save(&self, entry: &RequestLogEntry) -> Result<(), RequestLogRepositoryError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(entry.clone());
        Ok(())
    }
}
