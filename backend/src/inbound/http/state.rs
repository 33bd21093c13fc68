//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{FixturePatientRepository, PatientRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub patients: Arc<dyn PatientRepository>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// State backed by `patients` and the system clock.
    pub fn new(patients: Arc<dyn PatientRepository>) -> Self {
        Self {
            patients,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the clock used for date validation.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixturePatientRepository::default()))
    }
}
