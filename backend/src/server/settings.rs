//! Service configuration loaded via OrthoConfig.
//!
//! Sources, lowest precedence first: defaults, configuration file,
//! `CLINIC_*` environment variables, command-line flags.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DeploymentMode, UnknownDeploymentMode};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Raised when a setting cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error(transparent)]
    Environment(#[from] UnknownDeploymentMode),
}

/// Configuration values for the HTTP service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. When absent the service runs on in-memory fixtures.
    pub database_url: Option<String>,
    /// `Development` or `Production`.
    pub environment: Option<String>,
    /// Name recorded on request log rows.
    pub server_name: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Configured listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured deployment mode, defaulting to production.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Environment`] for unrecognised names.
    pub fn environment(&self) -> Result<DeploymentMode, SettingsError> {
        match self.environment.as_deref() {
            Some(name) => Ok(name.parse()?),
            None => Ok(DeploymentMode::default()),
        }
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Server name, falling back to the host name reported by the
    /// environment.
    pub fn server_name(&self) -> String {
        self.server_name
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .unwrap_or_default()
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}
