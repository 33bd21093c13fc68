//! Tests for envelope factories and their wire representation.

use super::*;
use rstest::rstest;
use serde_json::{Value, json};

fn wire<T: Serialize>(envelope: &ApiResponse<T>) -> Value {
    serde_json::to_value(envelope).expect("envelope serialises")
}

fn field_names(value: &Value) -> Vec<String> {
    let mut names: Vec<String> = value
        .as_object()
        .expect("envelope is a JSON object")
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

#[rstest]
#[case::ok(ApiResponse::ok(json!({"id": 1}), None), 200, true)]
#[case::created(ApiResponse::created(json!({"id": 1}), "/api/patients/1", None), 201, true)]
#[case::no_content(ApiResponse::no_content(), 204, true)]
#[case::bad_request(ApiResponse::bad_request("bad", None), 400, false)]
#[case::unauthorized(ApiResponse::unauthorized(None), 401, false)]
#[case::forbidden(ApiResponse::forbidden(None), 403, false)]
#[case::not_found(ApiResponse::not_found(None), 404, false)]
#[case::validation_failed(ApiResponse::validation_failed(Vec::new()), 422, false)]
#[case::server_error(ApiResponse::server_error("boom", None), 500, false)]
fn factories_set_status_and_outcome(
    #[case] envelope: ApiResponse<Value>,
    #[case] status: u16,
    #[case] success: bool,
) {
    assert_eq!(envelope.status(), status);
    assert_eq!(envelope.is_success(), success);
    if success {
        assert!(envelope.errors().is_none());
    } else {
        assert!(envelope.data().is_none());
    }
}

#[rstest]
fn wire_field_set_is_stable_across_factories() {
    let expected = field_names(&wire(&ApiResponse::ok(json!(1), None)));
    let others = [
        wire(&ApiResponse::<Value>::no_content()),
        wire(&ApiResponse::<Value>::validation_failed(vec![ErrorDetail::new(
            "Required", "x",
        )])),
        wire(&ApiResponse::<Value>::not_found(None)),
    ];
    for other in &others {
        assert_eq!(field_names(other), expected);
    }
    assert_eq!(
        expected,
        [
            "correlationId",
            "data",
            "errors",
            "message",
            "status",
            "success",
            "timestamp"
        ]
    );
}

#[rstest]
fn validation_failed_with_no_violations_keeps_empty_array() {
    let envelope = ApiResponse::<Value>::validation_failed(Vec::new());
    let body = wire(&envelope);
    assert_eq!(body["status"], 422);
    assert_eq!(body["message"], VALIDATION_FAILED_MESSAGE);
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["success"], false);
}

#[rstest]
#[case::unauthorized(ApiResponse::<Value>::unauthorized(None), "Unauthorized.")]
#[case::forbidden(ApiResponse::<Value>::forbidden(None), "Forbidden.")]
#[case::not_found(ApiResponse::<Value>::not_found(None), "Resource not found.")]
#[case::created(ApiResponse::created(json!(null), "/x", None), "Resource created.")]
fn default_messages_apply(#[case] envelope: ApiResponse<Value>, #[case] expected: &str) {
    assert_eq!(envelope.message(), Some(expected));
}

#[rstest]
fn explicit_messages_override_defaults() {
    let envelope = ApiResponse::<Value>::not_found(Some("Patient 7 not found.".to_owned()));
    assert_eq!(envelope.message(), Some("Patient 7 not found."));
}

#[rstest]
fn created_retains_location_without_serialising_it() {
    let envelope = ApiResponse::created(json!({"id": 7}), "/api/patients/7", None);
    assert_eq!(envelope.location(), Some("/api/patients/7"));
    assert!(wire(&envelope).get("location").is_none());
}

#[tokio::test]
async fn correlation_id_is_stamped_from_scope() {
    let id = CorrelationId::generate();
    let envelope = CorrelationId::scope(id, async { ApiResponse::ok(1_u8, None) }).await;
    assert_eq!(envelope.correlation_id(), id);
    assert_eq!(wire(&envelope)["correlationId"], id.to_string());
}

#[rstest]
fn envelopes_outside_a_request_still_get_an_id() {
    let first = ApiResponse::<Value>::no_content();
    let second = ApiResponse::<Value>::no_content();
    assert_ne!(first.correlation_id(), second.correlation_id());
}

#[rstest]
fn timestamp_serialises_as_utc_iso_8601() {
    let body = wire(&ApiResponse::ok(true, None));
    let raw = body["timestamp"].as_str().expect("timestamp is a string");
    let parsed = DateTime::parse_from_rfc3339(raw).expect("RFC 3339 timestamp");
    assert_eq!(parsed.offset().local_minus_utc(), 0);
}

#[rstest]
fn error_detail_serialises_target_as_null_when_unknown() {
    let body = serde_json::to_value(ErrorDetail::new("Concurrency", "retry")).expect("serialise");
    assert_eq!(
        body,
        json!({"code": "Concurrency", "message": "retry", "target": null})
    );
}
