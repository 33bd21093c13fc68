//! Server construction and middleware wiring.
//!
//! `RequestLog` is registered last so it is the outermost middleware: it
//! sees the response after `ErrorEnvelope` has rewritten any error.

mod config;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{AppSettings, SettingsError};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::patients::{create_patient, get_patient, list_patients};
use crate::inbound::http::ping::{ping, ping_body};
use crate::inbound::http::state::HttpState;
use crate::middleware::{ErrorEnvelope, LoggedBody, RequestLog};

use state_builders::build_ports;

/// Everything one worker's `App` needs.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub request_log: RequestLog,
    pub error_envelope: ErrorEnvelope,
}

/// Response body produced by the middleware stack around `App`.
pub type AppBody = LoggedBody;

/// Unmatched routes answer with a not-found envelope.
async fn route_not_found(req: actix_web::HttpRequest) -> ApiResult<actix_web::HttpResponse> {
    Err(Error::not_found(format!("No route for {} {}.", req.method(), req.path())))
}

/// Build the application for one worker.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::web;
/// use clinic_api::domain::DeploymentMode;
/// use clinic_api::domain::ports::FixtureRequestLogRepository;
/// use clinic_api::inbound::http::{health::HealthState, state::HttpState};
/// use clinic_api::middleware::{ErrorEnvelope, RequestLog};
/// use clinic_api::server::{AppDependencies, build_app};
///
/// let _app = build_app(AppDependencies {
///     health_state: web::Data::new(HealthState::new()),
///     http_state: web::Data::new(HttpState::default()),
///     request_log: RequestLog::new(
///         Arc::new(FixtureRequestLogRepository),
///         "doc",
///         DeploymentMode::Development,
///     ),
///     error_envelope: ErrorEnvelope::new(DeploymentMode::Development),
/// });
/// ```
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<AppBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        request_log,
        error_envelope,
    } = deps;

    let api = web::scope("/api")
        .service(ping)
        .service(ping_body)
        .service(list_patients)
        .service(get_patient)
        .service(create_patient);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live)
        .default_service(web::to(route_not_found))
        .wrap(error_envelope)
        .wrap(request_log)
}

/// Construct the HTTP server and mark it ready once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ports = build_ports(&config);
    let http_state = web::Data::new(HttpState::new(ports.patients));
    let request_log = RequestLog::new(ports.request_log, config.server_name, config.environment);
    let error_envelope = ErrorEnvelope::new(config.environment);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            request_log: request_log.clone(),
            error_envelope: error_envelope.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
