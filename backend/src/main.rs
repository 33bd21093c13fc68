//! Service entry-point: loads settings, prepares storage and runs the
//! HTTP server.

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_api::inbound::http::health::HealthState;
use clinic_api::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use clinic_api::server::{AppSettings, ServerConfig, create_server};
use ortho_config::OrthoConfig as _;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let environment = settings.environment().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr, environment, settings.server_name());
    if let Some(url) = settings.database_url() {
        run_pending_migrations(url)
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    info!(%bind_addr, environment = environment.as_str(), "starting clinic-api");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
