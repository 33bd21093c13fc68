//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module.
//!
//! # Example
//!
//! ```ignore
//! use clinic_api::outbound::persistence::{DbPool, DieselPatientRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinic")).await?;
//! let patients = DieselPatientRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_patient_repository;
mod diesel_request_log_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_patient_repository::DieselPatientRepository;
pub use diesel_request_log_repository::DieselRequestLogRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
