//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod patient_repository;
mod request_log_repository;

#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{FixturePatientRepository, PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use request_log_repository::MockRequestLogRepository;
pub use request_log_repository::{
    FixtureRequestLogRepository, RecordingRequestLogRepository, RequestLogRepository,
    RequestLogRepositoryError,
};
