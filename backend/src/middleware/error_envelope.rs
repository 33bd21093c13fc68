//! Exception classifier at the edge of the pipeline.
//!
//! Any error produced downstream, whether returned by a handler or raised by
//! an extractor, reaches this middleware as an errored response and is
//! classified exactly once here. The response is replaced with the failure
//! envelope and an [`ErrorReport`] is attached to its extensions for the
//! request log.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use crate::domain::{DeploymentMode, Error, ErrorReport, ExceptionClassifier};
use crate::inbound::http::envelope::render;

/// Middleware rendering every downstream error as a failure envelope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use clinic_api::domain::DeploymentMode;
/// use clinic_api::middleware::ErrorEnvelope;
///
/// let _app = App::new().wrap(ErrorEnvelope::new(DeploymentMode::Production));
/// ```
#[derive(Clone, Debug)]
pub struct ErrorEnvelope {
    classifier: Arc<ExceptionClassifier>,
}

impl ErrorEnvelope {
    /// Classify with the PostgreSQL engine mapping in `mode`.
    pub fn new(mode: DeploymentMode) -> Self {
        Self::with_classifier(ExceptionClassifier::new(mode))
    }

    /// Classify with a preconfigured classifier.
    pub fn with_classifier(classifier: ExceptionClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorEnvelope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ErrorEnvelopeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorEnvelopeMiddleware {
            service,
            classifier: Arc::clone(&self.classifier),
        }))
    }
}

/// Service wrapper produced by [`ErrorEnvelope`].
pub struct ErrorEnvelopeMiddleware<S> {
    service: S,
    classifier: Arc<ExceptionClassifier>,
}

impl<S, B> Service<ServiceRequest> for ErrorEnvelopeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let classifier = Arc::clone(&self.classifier);
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = match fut.await {
                Ok(res) => res,
                Err(err) => {
                    // No request is left to build a response from; the
                    // server renders this error itself.
                    error!(error = %err, "inner service failed without a response");
                    return Err(err);
                }
            };
            let Some(response) = res
                .response()
                .error()
                .map(|err| with_domain_error(err, |error| respond(&classifier, error)))
            else {
                return Ok(res.map_into_left_body());
            };
            let (request, _) = res.into_parts();
            Ok(ServiceResponse::new(request, response).map_into_right_body())
        })
    }
}

/// Run `f` against the domain error behind `err`, promoting foreign errors
/// by their HTTP status.
fn with_domain_error<R>(err: &actix_web::Error, f: impl FnOnce(&Error) -> R) -> R {
    match err.as_error::<Error>() {
        Some(domain) => f(domain),
        None => f(&promote(err)),
    }
}

/// Map an error raised outside the domain onto the taxonomy.
pub(crate) fn promote(err: &actix_web::Error) -> Error {
    let message = err.to_string();
    match err.as_response_error().status_code() {
        StatusCode::BAD_REQUEST => Error::invalid_argument(message),
        StatusCode::UNAUTHORIZED => Error::unauthenticated(message),
        StatusCode::FORBIDDEN => Error::access_denied(message),
        StatusCode::NOT_FOUND => Error::not_found(message),
        _ => Error::unclassified(message),
    }
}

fn respond(classifier: &ExceptionClassifier, error: &Error) -> HttpResponse {
    let envelope = classifier.classify(error);
    error!(
        error_type = %error.type_name(),
        error = %error,
        trace = %error.trace(),
        status = envelope.status(),
        correlation_id = %envelope.correlation_id(),
        "unhandled error"
    );
    let mut response = render(&envelope);
    response
        .extensions_mut()
        .insert(ErrorReport::from_error(error));
    response
}

#[cfg(test)]
mod tests {
    //! Classification at the HTTP edge.
    use super::*;
    use crate::domain::{
        CORRELATION_ID_HEADER, FieldViolation, GENERIC_ERROR_MESSAGE, StorageFailure,
    };
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;

    async fn call_with(
        mode: DeploymentMode,
        handler_error: fn() -> Error,
    ) -> ServiceResponse<EitherBody<actix_web::body::BoxBody>> {
        let app = actix_test::init_service(App::new().wrap(ErrorEnvelope::new(mode)).route(
            "/",
            web::get().to(move || async move { Err::<HttpResponse, Error>(handler_error()) }),
        ))
        .await;
        let req = actix_test::TestRequest::get().uri("/").to_request();
        actix_test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn validation_errors_become_422_envelopes() {
        let res = call_with(DeploymentMode::Production, || {
            Error::Validation(vec![FieldViolation::new(
                "MedicalRecordNumber",
                "Pattern",
                "MedicalRecordNumber must match pattern MRN000001.",
            )])
        })
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed.");
        assert_eq!(body["errors"][0]["target"], "MedicalRecordNumber");
        assert!(body["data"].is_null());
    }

    #[actix_web::test]
    async fn duplicate_keys_target_the_column() {
        let res = call_with(DeploymentMode::Production, || {
            Error::Storage(StorageFailure {
                detail: Some("Key (email)=(a@b.c) already exists.".to_owned()),
                ..StorageFailure::new("23505", "duplicate key value")
            })
        })
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["errors"][0]["code"], "Duplicate");
        assert_eq!(body["errors"][0]["target"], "Email");
    }

    #[rstest]
    #[case(DeploymentMode::Production, false)]
    #[case(DeploymentMode::Development, true)]
    #[actix_web::test]
    async fn unclassified_detail_depends_on_mode(
        #[case] mode: DeploymentMode,
        #[case] exposes: bool,
    ) {
        let res = call_with(mode, || Error::unclassified("disk on fire")).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = res
            .response()
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("error report attached");
        assert_eq!(report.message, "disk on fire");
        let body: Value = actix_test::read_body_json(res).await;
        if exposes {
            assert_eq!(body["message"], "disk on fire");
            assert_eq!(body["errors"][0]["code"], "Exception");
        } else {
            assert_eq!(body["message"], GENERIC_ERROR_MESSAGE);
            assert!(body["errors"].is_null());
        }
    }

    #[actix_web::test]
    async fn extractor_failures_are_promoted_by_status() {
        let app = actix_test::init_service(
            App::new()
                .wrap(ErrorEnvelope::new(DeploymentMode::Production))
                .route(
                    "/{id}",
                    web::get().to(|id: web::Path<u32>| async move {
                        HttpResponse::Ok().body(id.to_string())
                    }),
                ),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/abc").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn successful_responses_pass_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(ErrorEnvelope::new(DeploymentMode::Production))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("ok") })),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.response().extensions().get::<ErrorReport>().is_none());
        assert_eq!(actix_test::read_body(res).await, web::Bytes::from_static(b"ok"));
    }

    #[actix_web::test]
    async fn envelope_echoes_correlation_header() {
        let res = call_with(DeploymentMode::Production, || Error::not_found("gone")).await;
        let header = res
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("correlation header")
            .to_owned();
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["correlationId"], header);
    }

    #[rstest]
    fn promotes_foreign_errors_by_status() {
        let err: actix_web::Error = actix_web::error::ErrorForbidden("nope");
        assert_eq!(promote(&err).kind(), "AccessDenied");
        let err: actix_web::Error = actix_web::error::ErrorConflict("clash");
        assert_eq!(promote(&err).kind(), "Unclassified");
    }

    #[actix_web::test]
    async fn inner_service_errors_pass_through_untouched() {
        use actix_web::dev::{ServiceFactory, fn_service};

        let inner = fn_service(|_req: ServiceRequest| async {
            Err::<ServiceResponse, actix_web::Error>(actix_web::error::ErrorConflict("clash"))
        })
        .new_service(())
        .await
        .expect("inner service");
        let middleware = ErrorEnvelope::new(DeploymentMode::Production)
            .new_transform(inner)
            .await
            .expect("middleware");

        let outcome = middleware
            .call(actix_test::TestRequest::get().uri("/").to_srv_request())
            .await;
        let Err(err) = outcome else {
            panic!("expected the inner error to propagate");
        };
        assert_eq!(err.as_response_error().status_code(), StatusCode::CONFLICT);
    }
}
