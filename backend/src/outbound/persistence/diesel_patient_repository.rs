//! PostgreSQL-backed `PatientRepository` implementation using Diesel ORM.
//!
//! Constraint violations surface as [`PatientRepositoryError::Rejected`]
//! carrying the engine's own fields, so the exception classifier can turn a
//! duplicate medical record number into a field-level validation error.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::patient::{NewPatient, Patient};
use crate::domain::ports::{PatientRepository, PatientRepositoryError};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{NewPatientRow, PatientRow};
use super::pool::DbPool;
use super::schema::patients;

/// Diesel-backed implementation of the `PatientRepository` port.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PatientRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => PatientRepositoryError::connection(message),
        DieselFailure::Rejected(failure) => PatientRepositoryError::rejected(failure),
        DieselFailure::Query(message) => PatientRepositoryError::query(message),
    }
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn list(&self) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PatientRepositoryError::connection))?;

        let rows: Vec<PatientRow> = patients::table
            .order((patients::last_name.asc(), patients::first_name.asc()))
            .select(PatientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PatientRepositoryError::connection))?;

        let row: Option<PatientRow> = patients::table
            .filter(patients::id.eq(id))
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Patient::from))
    }

    async fn create(&self, patient: NewPatient) -> Result<Patient, PatientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PatientRepositoryError::connection))?;

        let new_row = NewPatientRow::from_domain(Uuid::new_v4(), &patient, Utc::now());
        let row: PatientRow = diesel::insert_into(patients::table)
            .values(&new_row)
            .returning(PatientRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row.into())
    }
}
