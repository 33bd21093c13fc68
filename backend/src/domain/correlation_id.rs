//! Request-scoped correlation and request identifiers.
//!
//! A [`CorrelationId`] links every log line, log row, and response envelope
//! produced while handling one HTTP request. Callers may supply their own via
//! the `X-Correlation-ID` header so retries can be correlated; otherwise one
//! is minted at request entry.
//!
//! The active identifier lives in task-local storage for the duration of the
//! downstream future. Tokio task-locals are not inherited by spawned tasks, so
//! wrap detached work in [`CorrelationId::scope`] when it should stay
//! correlated.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::task_local;
use uuid::Uuid;

/// Header carrying the correlation identifier in both directions.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Response header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

task_local! {
    static CORRELATION_ID: CorrelationId;
}

/// Per-request correlation identifier.
///
/// # Examples
/// ```
/// use clinic_api::domain::CorrelationId;
///
/// let inbound = Some("6f1c1c52-4d8a-4d5e-9f5a-0d1f2b3c4d5e");
/// let id = CorrelationId::resolve(inbound);
/// assert_eq!(id.to_string(), "6f1c1c52-4d8a-4d5e-9f5a-0d1f2b3c4d5e");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Mint a fresh random identifier.
    #[must_use]
    #[rustfmt::skip]
    pub fn generate() -> Self { Self(Uuid::new_v4()) }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Reuse the inbound header value when it is a well-formed UUID, else
    /// mint a new identifier. Never fails.
    #[must_use]
    pub fn resolve(header: Option<&str>) -> Self {
        header
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// The identifier in scope for the current task, if any.
    #[must_use]
    #[rustfmt::skip]
    pub fn current() -> Option<Self> { CORRELATION_ID.try_with(|id| *id).ok() }

    /// The identifier in scope, or a fresh one when called outside a request.
    #[must_use]
    pub fn current_or_generate() -> Self {
        Self::current().unwrap_or_else(Self::generate)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `correlation_id` available through [`Self::current`].
    ///
    /// # Examples
    /// ```
    /// use clinic_api::domain::CorrelationId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id = CorrelationId::generate();
    /// let observed = CorrelationId::scope(id, async { CorrelationId::current() }).await;
    /// assert_eq!(observed, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut>(correlation_id: CorrelationId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CORRELATION_ID.scope(correlation_id, fut).await
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CorrelationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier minted for every request; unlike [`CorrelationId`] it is never
/// taken from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mint a fresh random identifier.
    #[must_use]
    #[rustfmt::skip]
    pub fn generate() -> Self { Self(Uuid::new_v4()) }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
