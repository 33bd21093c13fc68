//! Connectivity check echoing a message back in upper case.
//!
//! ```text
//! GET  /api/ping?message=hello
//! POST /api/ping {"message":"hello"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ApiResponse, Error, FieldViolation};
use crate::inbound::http::ApiResult;

/// Longest message accepted, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 100;

/// Ping input, from the query string or a JSON body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PingRequest {
    pub message: Option<String>,
}

/// Echoed message.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
}

fn answer(request: PingRequest) -> ApiResult<ApiResponse<PingResponse>> {
    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(Error::Validation(vec![FieldViolation::new(
            "Message",
            "NotEmpty",
            "Message is required.",
        )]));
    }
    let length = message.chars().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(Error::Validation(vec![FieldViolation::new(
            "Message",
            "MaximumLength",
            format!(
                "Message must be {MAX_MESSAGE_LENGTH} characters or fewer. You entered {length} characters."
            ),
        )]));
    }
    Ok(ApiResponse::ok(
        PingResponse {
            message: message.to_uppercase(),
        },
        None,
    ))
}

#[get("/ping")]
pub async fn ping(query: web::Query<PingRequest>) -> ApiResult<ApiResponse<PingResponse>> {
    answer(query.into_inner())
}

#[post("/ping")]
pub async fn ping_body(body: web::Json<PingRequest>) -> ApiResult<ApiResponse<PingResponse>> {
    answer(body.into_inner())
}
