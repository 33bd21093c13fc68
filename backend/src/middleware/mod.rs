//! Request middleware.
//!
//! Purpose: define the request pipeline around the handlers. Wrap order
//! matters: [`RequestLog`] must be outermost so it observes the envelope
//! produced by [`ErrorEnvelope`].

pub mod error_envelope;
pub mod request_context;
pub mod request_log;

pub use error_envelope::ErrorEnvelope;
pub use request_context::RequestContext;
pub use request_log::{LoggedBody, RequestLog};
