//! Port for patient record storage.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::patient::{NewPatient, Patient};
use crate::domain::{Error, StorageFailure};

use super::define_port_error;

define_port_error! {
    /// Errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "patient repository connection failed: {message}",
        /// The storage engine rejected a write.
        Rejected { failure: StorageFailure } => "patient write rejected: {failure}",
        /// Query failed for a reason the engine did not classify.
        Query { message: String } => "patient repository query failed: {message}",
    }
}

impl From<PatientRepositoryError> for Error {
    fn from(value: PatientRepositoryError) -> Self {
        match value {
            PatientRepositoryError::Rejected { failure } => Error::Storage(failure),
            other => Error::unexpected("patient storage unavailable", other),
        }
    }
}

/// Patient persistence port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Every stored patient, ordered by last then first name.
    async fn list(&self) -> Result<Vec<Patient>, PatientRepositoryError>;

    /// The patient with `id`, if stored.
    async fn find(&self, id: Uuid) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Insert `patient` and return the stored record.
    async fn create(&self, patient: NewPatient) -> Result<Patient, PatientRepositoryError>;
}

/// In-memory repository used when no database is configured.
///
/// Enforces medical record number uniqueness the same way the database
/// does, reporting a PostgreSQL unique violation.
#[derive(Debug, Default)]
pub struct FixturePatientRepository {
    patients: Mutex<Vec<Patient>>,
}

impl FixturePatientRepository {
    fn snapshot(&self) -> Vec<Patient> {
        self.patients
            .lock()
            .map(|patients| patients.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl PatientRepository for FixturePatientRepository {
    async fn list(&self) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut patients = self.snapshot();
        patients.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        Ok(patients)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Patient>, PatientRepositoryError> {
        Ok(self.snapshot().into_iter().find(|p| p.id == id))
    }

    async fn create(&self, patient: NewPatient) -> Result<Patient, PatientRepositoryError> {
        let mut patients = self
            .patients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if patients
            .iter()
            .any(|p| p.medical_record_number == patient.medical_record_number)
        {
            return Err(PatientRepositoryError::rejected(StorageFailure {
                detail: Some(format!(
                    "Key (medical_record_number)=({}) already exists.",
                    patient.medical_record_number
                )),
                constraint: Some("patients_medical_record_number_key".to_owned()),
                table: Some("patients".to_owned()),
                ..StorageFailure::new(
                    crate::domain::sqlstate::UNIQUE_VIOLATION,
                    "duplicate key value violates unique constraint \"patients_medical_record_number_key\"",
                )
            }));
        }
        let now = Utc::now();
        let stored = Patient {
            id: Uuid::new_v4(),
            medical_record_number: patient.medical_record_number,
            first_name: patient.first_name,
            last_name: patient.last_name,
            date_of_birth: patient.date_of_birth,
            gender: patient.gender,
            address: patient.address,
            phone_number: patient.phone_number,
            email: patient.email,
            insurance_provider_id: patient.insurance_provider_id,
            insurance_policy_number: patient.insurance_policy_number,
            created_at: now,
            updated_at: now,
        };
        patients.push(stored.clone());
        Ok(stored)
    }
}
