//! Patient records REST service: correlation, response envelopes, request
//! logging and error classification around a small CRUD surface.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
