//! PostgreSQL-backed `RequestLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::RequestLogEntry;
use crate::domain::ports::{RequestLogRepository, RequestLogRepositoryError};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::NewRequestLogRow;
use super::pool::DbPool;
use super::schema::request_logs;

/// Appends one row per exchange to `request_logs`.
#[derive(Clone)]
pub struct DieselRequestLogRepository {
    pool: DbPool,
}

impl DieselRequestLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> RequestLogRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RequestLogRepositoryError::connection(message),
        DieselFailure::Rejected(failure) => RequestLogRepositoryError::query(failure.to_string()),
        DieselFailure::Query(message) => RequestLogRepositoryError::query(message),
    }
}

#[async_trait]
impl RequestLogRepository for DieselRequestLogRepository {
    async fn save(&self, entry: &RequestLogEntry) -> Result<(), RequestLogRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, RequestLogRepositoryError::connection))?;

        diesel::insert_into(request_logs::table)
            .values(&NewRequestLogRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
