//! HTTP server configuration object.

use std::net::SocketAddr;

use crate::domain::DeploymentMode;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) environment: DeploymentMode,
    pub(crate) server_name: String,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        environment: DeploymentMode,
        server_name: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            environment,
            server_name: server_name.into(),
            db_pool: None,
        }
    }

    /// Attach a database pool; without one the server runs on fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[must_use]
    pub fn environment(&self) -> DeploymentMode {
        self.environment
    }
}
