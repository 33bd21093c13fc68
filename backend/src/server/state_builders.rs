//! Port selection: Diesel adapters when a pool is configured, fixtures
//! otherwise.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{
    FixturePatientRepository, FixtureRequestLogRepository, PatientRepository,
    RequestLogRepository,
};
use crate::outbound::persistence::{DieselPatientRepository, DieselRequestLogRepository};

use super::ServerConfig;

/// Ports shared by every worker.
#[derive(Clone)]
pub(crate) struct Ports {
    pub patients: Arc<dyn PatientRepository>,
    pub request_log: Arc<dyn RequestLogRepository>,
}

pub(crate) fn build_ports(config: &ServerConfig) -> Ports {
    match &config.db_pool {
        Some(pool) => Ports {
            patients: Arc::new(DieselPatientRepository::new(pool.clone())),
            request_log: Arc::new(DieselRequestLogRepository::new(pool.clone())),
        },
        None => {
            warn!("no database configured; using in-memory patients and discarding request logs");
            Ports {
                patients: Arc::new(FixturePatientRepository::default()),
                request_log: Arc::new(FixtureRequestLogRepository),
            }
        }
    }
}
