//! HTTP rendering for response envelopes.
//!
//! Envelopes carry their own status; this adapter turns that status into the
//! response line, echoes the correlation identifier, sets `Location` for
//! created resources, and sends `204` responses without a body.

use actix_web::body::BoxBody;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::domain::{ApiResponse, CORRELATION_ID_HEADER};

/// Render `envelope` as an HTTP response.
pub fn render<T: Serialize>(envelope: &ApiResponse<T>) -> HttpResponse {
    let status =
        StatusCode::from_u16(envelope.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);
    builder.insert_header((CORRELATION_ID_HEADER, envelope.correlation_id().to_string()));
    if let Some(location) = envelope.location() {
        builder.insert_header((header::LOCATION, location));
    }
    if status == StatusCode::NO_CONTENT {
        return builder.finish();
    }
    builder.json(envelope)
}

impl<T: Serialize> Responder for ApiResponse<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        render(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn created_sets_location_header() {
        let app = test::init_service(App::new().route(
            "/",
            web::post().to(|| async {
                ApiResponse::created(json!({"id": 7}), "/api/patients/7", None)
            }),
        ))
        .await;
        let res = test::call_service(&app, test::TestRequest::post().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/api/patients/7")
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Resource created.");
    }

    #[actix_web::test]
    async fn no_content_has_empty_body() {
        let app = test::init_service(App::new().route(
            "/",
            web::delete().to(|| async { ApiResponse::<()>::no_content() }),
        ))
        .await;
        let res =
            test::call_service(&app, test::TestRequest::delete().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(test::read_body(res).await.is_empty());
    }

    #[actix_web::test]
    async fn body_correlation_id_matches_header() {
        let app = test::init_service(
            App::new().route("/", web::get().to(|| async { ApiResponse::ok(1, None) })),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = res
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("correlation header")
            .to_owned();
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["correlationId"], header);
    }
}
