//! Correlation and request logging middleware.
//!
//! On entry the middleware resolves the correlation identifier, mints a
//! request identifier, and buffers small JSON bodies. The downstream future
//! then runs inside a tracing span and a correlation scope. Once a response
//! exists both identifiers are echoed as headers and the response body is
//! wrapped in a [`LoggedBody`]. When that body has been fully written, or is
//! dropped early, the [`RequestLogEntry`] is built and persisted on a
//! detached task, so the response is never delayed or altered by the sink.

use std::pin::{Pin, pin};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::body::{BodySize, BoxBody, MessageBody};
use actix_web::dev::{Decompress, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::PayloadError;
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::web::{Bytes, BytesMut};
use actix_web::{Error, HttpMessage};
use chrono::{DateTime, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use futures_util::stream::{self, Stream, StreamExt};
use mockable::{Clock, DefaultClock};
use tracing::{Instrument, debug, error, info_span, warn};

use super::RequestContext;
use super::error_envelope::promote;
use crate::domain::ports::RequestLogRepository;
use crate::domain::request_log::{Exchange, RequestFacts, ResponseFacts};
use crate::domain::{
    CORRELATION_ID_HEADER, CorrelationId, DeploymentMode, ErrorReport, IdentityClaims,
    REQUEST_ID_HEADER, RequestId, RequestLogEntry,
};

/// Largest request body, in bytes, captured into the log row.
pub const MAX_BUFFERED_BODY: u64 = 64 * 1024;

/// Middleware assigning correlation identifiers and recording one log row
/// per request.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::App;
/// use clinic_api::domain::DeploymentMode;
/// use clinic_api::domain::ports::FixtureRequestLogRepository;
/// use clinic_api::middleware::RequestLog;
///
/// let log = RequestLog::new(
///     Arc::new(FixtureRequestLogRepository),
///     "api-01",
///     DeploymentMode::Production,
/// );
/// let _app = App::new().wrap(log);
/// ```
#[derive(Clone)]
pub struct RequestLog {
    sink: Arc<dyn RequestLogRepository>,
    clock: Arc<dyn Clock>,
    server_name: Arc<str>,
    environment: DeploymentMode,
}

impl RequestLog {
    /// Record rows into `sink`, stamped with the host and environment.
    pub fn new(
        sink: Arc<dyn RequestLogRepository>,
        server_name: impl Into<String>,
        environment: DeploymentMode,
    ) -> Self {
        Self {
            sink,
            clock: Arc::new(DefaultClock),
            server_name: Arc::from(server_name.into()),
            environment,
        }
    }

    /// Replace the clock used for request start times.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn exchange(
        &self,
        ids: RequestContext,
        started_at: DateTime<Utc>,
        request: RequestFacts,
    ) -> Exchange {
        Exchange {
            request_id: ids.request_id,
            correlation_id: ids.correlation_id,
            claims: IdentityClaims::default(),
            started_at,
            elapsed: Duration::ZERO,
            request,
            response: ResponseFacts::default(),
            error: None,
            server_name: self.server_name.to_string(),
            environment: Some(self.environment.as_str().to_owned()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<LoggedBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddleware {
            service: Rc::new(service),
            config: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`RequestLog`].
pub struct RequestLogMiddleware<S> {
    service: Rc<S>,
    config: RequestLog,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<LoggedBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = self.config.clone();
        let started = Instant::now();
        let started_at = config.clock.utc();

        let ids = RequestContext {
            correlation_id: CorrelationId::resolve(
                req.headers()
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|value| value.to_str().ok()),
            ),
            request_id: RequestId::generate(),
        };
        req.extensions_mut().insert(ids);

        let span = info_span!(
            "http_request",
            correlation_id = %ids.correlation_id,
            request_id = %ids.request_id,
            method = %req.method(),
            path = %req.path(),
        );

        Box::pin(
            async move {
                let mut facts = capture_request(&req);
                if should_buffer(&req) {
                    facts.body = buffer_body(&mut req).await;
                }
                let mut exchange = config.exchange(ids, started_at, facts);

                let downstream = async move { service.call(req).await };
                let mut res = match CorrelationId::scope(ids.correlation_id, downstream).await {
                    Ok(res) => res,
                    Err(err) => {
                        error!(error = %err, "request failed before producing a response");
                        exchange.response.status = err.as_response_error().status_code().as_u16();
                        exchange.error = Some(ErrorReport::from_error(&promote(&err)));
                        exchange.elapsed = started.elapsed();
                        persist(
                            Arc::clone(&config.sink),
                            RequestLogEntry::from_exchange(exchange),
                        );
                        return Err(err);
                    }
                };
                set_header(&mut res, CORRELATION_ID_HEADER, &ids.correlation_id.to_string());
                set_header(&mut res, REQUEST_ID_HEADER, &ids.request_id.to_string());

                exchange.claims = res
                    .request()
                    .extensions()
                    .get::<IdentityClaims>()
                    .cloned()
                    .unwrap_or_default();
                exchange.response = capture_response(&res);
                exchange.error = res.response().extensions().get::<ErrorReport>().cloned();

                let pending = PendingLog {
                    sink: Arc::clone(&config.sink),
                    started,
                    exchange,
                };
                Ok(res.map_body(|_, body| LoggedBody::new(body.boxed(), pending)))
            }
            .instrument(span),
        )
    }
}

/// A log row waiting for its response body to finish.
struct PendingLog {
    sink: Arc<dyn RequestLogRepository>,
    started: Instant,
    exchange: Exchange,
}

impl PendingLog {
    fn finish(mut self) {
        self.exchange.elapsed = self.started.elapsed();
        persist(self.sink, RequestLogEntry::from_exchange(self.exchange));
    }
}

/// Response body that persists the request log row once it has been fully
/// written or dropped.
pub struct LoggedBody {
    body: BoxBody,
    pending: Option<PendingLog>,
}

impl LoggedBody {
    fn new(body: BoxBody, pending: PendingLog) -> Self {
        Self {
            body,
            pending: Some(pending),
        }
    }

    fn finish(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.finish();
        }
    }
}

impl MessageBody for LoggedBody {
    type Error = Box<dyn std::error::Error>;

    fn size(&self) -> BodySize {
        self.body.size()
    }

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.body).poll_next(cx);
        if let Poll::Ready(None) = polled {
            this.finish();
        }
        polled
    }
}

impl Drop for LoggedBody {
    fn drop(&mut self) {
        self.finish();
    }
}

fn persist(sink: Arc<dyn RequestLogRepository>, entry: RequestLogEntry) {
    let correlation_id = entry.correlation_id;
    let request_id = entry.request_id;
    let task = CorrelationId::scope(correlation_id, async move {
        match sink.save(&entry).await {
            Ok(()) => debug!(%correlation_id, %request_id, "request log persisted"),
            Err(error) => warn!(
                %error,
                %correlation_id,
                %request_id,
                "failed to persist request log (non-blocking)"
            ),
        }
    });
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(error) => warn!(
            %error,
            %correlation_id,
            %request_id,
            "no runtime available, request log dropped"
        ),
    }
}

fn set_header<B>(res: &mut ServiceResponse<B>, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            res.headers_mut().insert(HeaderName::from_static(name), value);
        }
        Err(error) => error!(%error, header = name, "failed to encode identifier header"),
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn content_length(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn capture_request(req: &ServiceRequest) -> RequestFacts {
    let info = req.connection_info();
    let headers = req.headers();
    RequestFacts {
        method: req.method().as_str().to_owned(),
        scheme: info.scheme().to_owned(),
        host: info.host().to_owned(),
        path: req.path().to_owned(),
        query_string: Some(req.query_string().to_owned()),
        remote_ip: req.peer_addr().map(|addr| addr.ip().to_string()),
        user_agent: header_text(headers, header::USER_AGENT),
        referrer: header_text(headers, header::REFERER),
        content_type: header_text(headers, header::CONTENT_TYPE),
        content_length: content_length(headers),
        headers: header_pairs(headers),
        body: None,
    }
}

fn capture_response<B: MessageBody>(res: &ServiceResponse<B>) -> ResponseFacts {
    let bytes_sent = match res.response().body().size() {
        BodySize::Sized(size) => i64::try_from(size).ok(),
        BodySize::None => Some(0),
        BodySize::Stream => content_length(res.headers()),
    };
    ResponseFacts {
        status: res.status().as_u16(),
        content_type: header_text(res.headers(), header::CONTENT_TYPE),
        content_length: bytes_sent,
        headers: header_pairs(res.headers()),
    }
}

/// JSON bodies with a declared length within [`MAX_BUFFERED_BODY`].
fn should_buffer(req: &ServiceRequest) -> bool {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"));
    let length = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    is_json && length.is_some_and(|length| length > 0 && length <= MAX_BUFFERED_BODY)
}

/// Read the raw body and reinstall exactly those bytes, so handlers still
/// decode the payload themselves. Only the logged copy is decompressed.
async fn buffer_body(req: &mut ServiceRequest) -> Option<String> {
    let mut payload = req.take_payload();
    let mut raw = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        match chunk {
            Ok(chunk) => raw.extend_from_slice(&chunk),
            Err(error) => {
                debug!(%error, "request body could not be buffered for logging");
                let replay: Pin<Box<dyn Stream<Item = Result<Bytes, PayloadError>>>> =
                    Box::pin(stream::iter([Ok(raw.freeze()), Err(error)]));
                req.set_payload(Payload::Stream { payload: replay });
                return None;
            }
        }
    }
    let raw = raw.freeze();
    let text = decoded_text(raw.clone(), req.headers()).await;
    req.set_payload(Payload::from(raw));
    text
}

/// Decode `raw` per `Content-Encoding`, keeping at most
/// [`MAX_BUFFERED_BODY`] bytes of the result.
async fn decoded_text(raw: Bytes, headers: &HeaderMap) -> Option<String> {
    let mut decoded = pin!(Decompress::<Payload>::from_headers(Payload::from(raw), headers));
    let mut text = BytesMut::new();
    while let Some(chunk) = decoded.next().await {
        match chunk {
            Ok(chunk) => {
                text.extend_from_slice(&chunk);
                if text.len() as u64 > MAX_BUFFERED_BODY {
                    break;
                }
            }
            Err(error) => {
                debug!(%error, "request body could not be decoded for logging");
                return None;
            }
        }
    }
    Some(String::from_utf8_lossy(&text).into_owned())
}

#[cfg(test)]
mod tests {
    //! Middleware behaviour against in-process services.
    use super::*;
    use crate::domain::ports::{MockRequestLogRepository, RecordingRequestLogRepository};
    use crate::domain::request_log::REDACTION_MARKER;
    use actix_web::dev::{ServiceFactory, fn_service};
    use actix_web::{App, HttpResponse, test, web};
    use serde_json::json;

    /// `{"message":"hello"}` compressed with gzip.
    const GZIPPED_HELLO: [u8; 39] = [
        0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0xab, 0x56, 0xca, 0x4d, 0x2d,
        0x2e, 0x4e, 0x4c, 0x4f, 0x55, 0xb2, 0x52, 0xca, 0x48, 0xcd, 0xc9, 0xc9, 0x57, 0xaa, 0x05,
        0x00, 0x8c, 0x6b, 0xd8, 0x11, 0x13, 0x00, 0x00, 0x00,
    ];

    async fn drain_spawned() {
        // Detached persistence runs on the test runtime.
        for _ in 0..5 {
            actix_web::rt::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn recorder(sink: Arc<RecordingRequestLogRepository>) -> RequestLog {
        RequestLog::new(sink, "test-host", DeploymentMode::Development)
    }

    #[actix_web::test]
    async fn echoes_valid_inbound_correlation_id() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(
            App::new()
                .wrap(recorder(sink.clone()))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let inbound = "3f2504e0-4f89-41d3-9a0c-0305e82c3301";
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((CORRELATION_ID_HEADER, inbound))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(
            res.headers()
                .get(CORRELATION_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some(inbound)
        );
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
        drop(res);
        drain_spawned().await;
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].correlation_id.to_string(), inbound);
    }

    #[actix_web::test]
    async fn replaces_malformed_correlation_id() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(
            App::new()
                .wrap(recorder(sink))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((CORRELATION_ID_HEADER, "not-a-uuid"))
            .to_request();
        let res = test::call_service(&app, req).await;
        let echoed = res
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("correlation header");
        assert_ne!(echoed, "not-a-uuid");
        assert!(echoed.parse::<CorrelationId>().is_ok());
    }

    #[actix_web::test]
    async fn handlers_observe_scope_and_context() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(App::new().wrap(recorder(sink)).route(
            "/",
            web::get().to(|ctx: RequestContext| async move {
                let scoped = CorrelationId::current().expect("correlation id in scope");
                assert_eq!(scoped, ctx.correlation_id);
                HttpResponse::Ok().body(ctx.request_id.to_string())
            }),
        ))
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = res
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("request id header")
            .to_owned();
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8"), header);
    }

    #[actix_web::test]
    async fn json_body_is_logged_and_still_readable() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(App::new().wrap(recorder(sink.clone())).route(
            "/",
            web::post().to(|body: web::Json<serde_json::Value>| async move {
                HttpResponse::Ok().json(body.into_inner())
            }),
        ))
        .await;
        let payload = serde_json::json!({"firstName": "Ada"});
        let req = test::TestRequest::post()
            .uri("/")
            .insert_header(("authorization", "Bearer secret"))
            .set_json(&payload)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let echoed: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(echoed, payload);

        drain_spawned().await;
        let entry = sink.entries().pop().expect("one entry");
        assert_eq!(entry.request_body.as_deref(), Some(r#"{"firstName":"Ada"}"#));
        let headers: serde_json::Value =
            serde_json::from_str(entry.request_headers.as_deref().expect("headers"))
                .expect("json headers");
        assert_eq!(headers["authorization"], REDACTION_MARKER);
        assert_eq!(entry.method, "POST");
        assert_eq!(entry.status_code, 200);
        assert_eq!(entry.environment.as_deref(), Some("Development"));
        assert_eq!(entry.server_name, "test-host");
    }

    #[actix_web::test]
    async fn non_json_bodies_are_not_buffered() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(
            App::new()
                .wrap(recorder(sink.clone()))
                .route("/", web::post().to(|body: String| async move { body })),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("hello")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(test::read_body(res).await, Bytes::from_static(b"hello"));
        drain_spawned().await;
        assert!(sink.entries()[0].request_body.is_none());
    }

    #[actix_web::test]
    async fn sink_failures_do_not_change_the_response() {
        let mut sink = MockRequestLogRepository::new();
        sink.expect_save()
            .times(1)
            .returning(|_| Err(crate::domain::ports::RequestLogRepositoryError::query("down")));
        let app = test::init_service(
            App::new()
                .wrap(RequestLog::new(
                    Arc::new(sink),
                    "test-host",
                    DeploymentMode::Production,
                ))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("fine") })),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), 200);
        assert_eq!(test::read_body(res).await, Bytes::from_static(b"fine"));
        drain_spawned().await;
    }

    #[actix_web::test]
    async fn claims_resolve_the_user() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(App::new().wrap(recorder(sink.clone())).route(
            "/",
            web::get().to(|req: actix_web::HttpRequest| async move {
                req.extensions_mut()
                    .insert(IdentityClaims::new().with("oid", "object-9"));
                HttpResponse::NoContent().finish()
            }),
        ))
        .await;
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        drain_spawned().await;
        let entry = sink.entries().pop().expect("entry");
        assert_eq!(entry.user_id.as_deref(), Some("object-9"));
        assert_eq!(entry.status_code, 204);
    }

    #[actix_web::test]
    async fn uses_injected_clock_for_start_time() {
        use chrono::{DateTime, Local, TimeZone, Utc};

        struct FixedClock(DateTime<Utc>);
        impl Clock for FixedClock {
            fn local(&self) -> DateTime<Local> {
                self.0.with_timezone(&Local)
            }
            fn utc(&self) -> DateTime<Utc> {
                self.0
            }
        }

        let at = Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(
            App::new()
                .wrap(recorder(sink.clone()).with_clock(Arc::new(FixedClock(at))))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        drain_spawned().await;
        assert_eq!(sink.entries()[0].request_time, at);
    }

    #[actix_web::test]
    async fn compressed_json_reaches_the_handler_intact() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(App::new().wrap(recorder(sink.clone())).route(
            "/",
            web::post().to(|body: web::Json<serde_json::Value>| async move {
                HttpResponse::Ok().json(body.into_inner())
            }),
        ))
        .await;
        let req = test::TestRequest::post()
            .uri("/")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .insert_header((header::CONTENT_ENCODING, "gzip"))
            .insert_header((header::CONTENT_LENGTH, GZIPPED_HELLO.len()))
            .set_payload(Bytes::from_static(&GZIPPED_HELLO))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let echoed: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(echoed, json!({"message": "hello"}));

        drain_spawned().await;
        let entry = sink.entries().pop().expect("one entry");
        assert_eq!(entry.request_body.as_deref(), Some(r#"{"message":"hello"}"#));
    }

    #[actix_web::test]
    async fn rows_wait_for_the_body_to_be_written() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let app = test::init_service(
            App::new()
                .wrap(recorder(sink.clone()))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("payload") })),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        drain_spawned().await;
        assert!(sink.entries().is_empty());

        assert_eq!(test::read_body(res).await, Bytes::from_static(b"payload"));
        drain_spawned().await;
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bytes_sent, Some(7));
    }

    #[actix_web::test]
    async fn service_errors_propagate_and_are_still_logged() {
        let sink = Arc::new(RecordingRequestLogRepository::default());
        let inner = fn_service(|_req: ServiceRequest| async {
            Err::<ServiceResponse, Error>(actix_web::error::ErrorConflict("clash"))
        })
        .new_service(())
        .await
        .expect("inner service");
        let middleware = recorder(sink.clone())
            .new_transform(inner)
            .await
            .expect("middleware");

        let outcome = middleware
            .call(test::TestRequest::get().uri("/boom").to_srv_request())
            .await;
        let Err(err) = outcome else {
            panic!("expected the inner error to propagate");
        };
        assert_eq!(err.as_response_error().status_code(), 409);

        drain_spawned().await;
        let entry = sink.entries().pop().expect("one entry");
        assert_eq!(entry.status_code, 409);
        assert_eq!(entry.path, "/boom");
        assert!(entry.exception_message.is_some());
    }
}
