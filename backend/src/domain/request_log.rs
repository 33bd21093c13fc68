//! Structured request log rows.
//!
//! The middleware gathers raw request and response facts into an
//! [`Exchange`]; [`RequestLogEntry::from_exchange`] applies the field bounds,
//! header redaction and user resolution so every persisted row obeys the
//! column limits regardless of what the client sent.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CorrelationId, RequestId};

/// Value written in place of sensitive header values.
pub const REDACTION_MARKER: &str = "***REDACTED***";

/// Header names whose values never reach the log, compared case-insensitively.
pub const SENSITIVE_HEADERS: [&str; 3] = ["authorization", "cookie", "set-cookie"];

/// Claim identifying a machine or directory object.
pub const OBJECT_ID_CLAIM: &str = "oid";
/// Standard subject claim.
pub const SUBJECT_CLAIM: &str = "sub";
/// Generic name-identifier claim.
pub const NAME_IDENTIFIER_CLAIM: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";

/// Maximum stored length, in characters, of each bounded field.
pub mod limits {
    pub const SCHEME: usize = 5;
    pub const HOST: usize = 255;
    pub const PATH: usize = 2048;
    pub const QUERY_STRING: usize = 4000;
    pub const REMOTE_IP: usize = 45;
    pub const USER_AGENT: usize = 512;
    pub const REFERRER: usize = 512;
    pub const CONTENT_TYPE: usize = 100;
    pub const HEADER_VALUE: usize = 2000;
    pub const BODY: usize = 8000;
    pub const EXCEPTION_TYPE: usize = 200;
    pub const EXCEPTION_MESSAGE: usize = 2000;
    pub const SERVER_NAME: usize = 128;
    pub const ENVIRONMENT: usize = 32;
    pub const METHOD: usize = 10;
    pub const USER_ID: usize = 100;
}

/// Cut `value` to at most `max_chars` characters.
///
/// The cut always lands on a character boundary, so applying it twice with
/// the same bound yields the same string.
///
/// # Examples
/// ```
/// use clinic_api::domain::request_log::truncate;
///
/// assert_eq!(truncate("héllo", 2), "hé");
/// assert_eq!(truncate("hi", 10), "hi");
/// ```
pub fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => value[..cut].to_owned(),
        None => value.to_owned(),
    }
}

fn truncate_opt(value: Option<String>, max_chars: usize) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| truncate(&v, max_chars))
}

/// Serialise a header set into a JSON object string.
///
/// Sensitive values are replaced by [`REDACTION_MARKER`]; every other value
/// is cut to [`limits::HEADER_VALUE`] characters. Repeated names are joined
/// with `", "`.
pub fn serialize_headers<'a, I>(headers: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let rendered = if is_sensitive(name) {
            REDACTION_MARKER.to_owned()
        } else {
            truncate(value, limits::HEADER_VALUE)
        };
        collected
            .entry(name.to_owned())
            .and_modify(|existing| {
                if !is_sensitive(name) {
                    existing.push_str(", ");
                    existing.push_str(&rendered);
                }
            })
            .or_insert(rendered);
    }
    // A map of strings always serialises.
    serde_json::to_string(&collected).unwrap_or_default()
}

fn is_sensitive(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
}

/// Identity claims attached to a request by an upstream authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims(HashMap<String, String>);

impl IdentityClaims {
    /// Empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a claim.
    #[must_use]
    pub fn with(mut self, claim: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(claim.into(), value.into());
        self
    }

    /// Value of `claim`, if present.
    pub fn get(&self, claim: &str) -> Option<&str> {
        self.0.get(claim).map(String::as_str)
    }

    /// Acting user: object id, then subject, then name identifier.
    ///
    /// Blank values are skipped. No usable claim means an anonymous request.
    pub fn user_id(&self) -> Option<String> {
        [OBJECT_ID_CLAIM, SUBJECT_CLAIM, NAME_IDENTIFIER_CLAIM]
            .into_iter()
            .filter_map(|claim| self.get(claim))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(|value| truncate(value, limits::USER_ID))
    }
}

impl<K, V> FromIterator<(K, V)> for IdentityClaims
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Summary of an unhandled error, attached to the response by the error
/// envelope middleware and copied onto the log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Fully qualified error type.
    pub type_name: String,
    /// Top-level error message.
    pub message: String,
    /// Error followed by its cause chain.
    pub trace: String,
}

impl ErrorReport {
    /// Report for a domain error.
    pub fn from_error(error: &super::Error) -> Self {
        Self {
            type_name: error.type_name(),
            message: error.to_string(),
            trace: error.trace(),
        }
    }
}

/// Raw request facts captured on entry.
#[derive(Debug, Clone, Default)]
pub struct RequestFacts {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query_string: Option<String>,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Raw response facts captured once the pipeline completes.
#[derive(Debug, Clone, Default)]
pub struct ResponseFacts {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
    pub headers: Vec<(String, String)>,
}

/// Everything known about one request/response cycle.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request_id: RequestId,
    pub correlation_id: CorrelationId,
    pub claims: IdentityClaims,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub request: RequestFacts,
    pub response: ResponseFacts,
    pub error: Option<ErrorReport>,
    pub server_name: String,
    pub environment: Option<String>,
}

/// One persisted row per HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLogEntry {
    pub request_id: RequestId,
    pub correlation_id: CorrelationId,
    pub user_id: Option<String>,
    pub request_time: DateTime<Utc>,
    pub request_date: NaiveDate,
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query_string: Option<String>,
    pub status_code: i32,
    pub duration_ms: i32,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub request_content_type: Option<String>,
    pub response_content_type: Option<String>,
    pub bytes_received: Option<i64>,
    pub bytes_sent: Option<i64>,
    pub request_headers: Option<String>,
    pub response_headers: Option<String>,
    pub request_body: Option<String>,
    /// Reserved; responses are never captured.
    pub response_body: Option<String>,
    pub exception_type: Option<String>,
    pub exception_message: Option<String>,
    pub exception_stack_trace: Option<String>,
    pub server_name: String,
    pub environment: Option<String>,
}

impl RequestLogEntry {
    /// Bound, redact and resolve the raw facts of one exchange.
    pub fn from_exchange(exchange: Exchange) -> Self {
        let Exchange {
            request_id,
            correlation_id,
            claims,
            started_at,
            elapsed,
            request,
            response,
            error,
            server_name,
            environment,
        } = exchange;

        let scheme = match request.scheme.trim() {
            "" => "http".to_owned(),
            scheme => truncate(scheme, limits::SCHEME),
        };
        let server_name = match server_name.trim() {
            "" => "unknown".to_owned(),
            name => truncate(name, limits::SERVER_NAME),
        };
        let (exception_type, exception_message, exception_stack_trace) = match error {
            Some(report) => (
                Some(truncate(&report.type_name, limits::EXCEPTION_TYPE)),
                Some(truncate(&report.message, limits::EXCEPTION_MESSAGE)),
                Some(report.trace),
            ),
            None => (None, None, None),
        };

        Self {
            request_id,
            correlation_id,
            user_id: claims.user_id(),
            request_time: started_at,
            request_date: started_at.date_naive(),
            method: truncate(&request.method, limits::METHOD),
            scheme,
            host: truncate(&request.host, limits::HOST),
            path: truncate(&request.path, limits::PATH),
            query_string: truncate_opt(request.query_string, limits::QUERY_STRING),
            status_code: i32::from(response.status),
            duration_ms: i32::try_from(elapsed.as_millis()).unwrap_or(i32::MAX),
            remote_ip: truncate_opt(request.remote_ip, limits::REMOTE_IP),
            user_agent: truncate_opt(request.user_agent, limits::USER_AGENT),
            referrer: truncate_opt(request.referrer, limits::REFERRER),
            request_content_type: truncate_opt(request.content_type, limits::CONTENT_TYPE),
            response_content_type: truncate_opt(response.content_type, limits::CONTENT_TYPE),
            bytes_received: request.content_length,
            bytes_sent: response.content_length,
            request_headers: Some(serialize_headers(
                request.headers.iter().map(|(n, v)| (n.as_str(), v.as_str())),
            )),
            response_headers: Some(serialize_headers(
                response.headers.iter().map(|(n, v)| (n.as_str(), v.as_str())),
            )),
            request_body: truncate_opt(request.body, limits::BODY),
            response_body: None,
            exception_type,
            exception_message,
            exception_stack_trace,
            server_name,
            environment: truncate_opt(environment, limits::ENVIRONMENT),
        }
    }
}
