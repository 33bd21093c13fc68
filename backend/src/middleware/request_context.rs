//! Request-scoped identifiers exposed to handlers.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::{CorrelationId, RequestId};

/// Identifiers assigned to the current request by [`super::RequestLog`].
///
/// Inserted into the request extensions on entry. Extracting it outside the
/// middleware yields freshly minted identifiers rather than an error.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use clinic_api::middleware::RequestContext;
///
/// async fn handler(ctx: RequestContext) -> HttpResponse {
///     HttpResponse::Ok().body(ctx.correlation_id.to_string())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation identifier shared with the caller.
    pub correlation_id: CorrelationId,
    /// Identifier unique to this request.
    pub request_id: RequestId,
}

impl RequestContext {
    /// Context stored on `req`, if the middleware ran.
    pub fn of(req: &HttpRequest) -> Option<Self> {
        req.extensions().get::<Self>().copied()
    }
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = Self::of(req).unwrap_or_else(|| Self {
            correlation_id: CorrelationId::current_or_generate(),
            request_id: RequestId::generate(),
        });
        ready(Ok(context))
    }
}
