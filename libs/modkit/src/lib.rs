//! # ModKit - shared building blocks for service modules
//!
//! - `api::problem`: RFC 9457 problem responses used by every REST handler
//! - `context`: per-request deadline and cancellation (`RequestCtx`)
//! - `http::deadline`: middleware attaching a `RequestCtx` to each request
//! - `http::client`: traced outgoing HTTP client
//! - `runtime::shutdown`: OS signal handling for graceful shutdown

pub use anyhow::Result;

pub mod api;
pub mod context;
pub mod http;
pub mod runtime;

pub use api::problem::{
    internal_error, not_found, request_timeout, unauthorized, Problem, ProblemResponse,
    ValidationError, APPLICATION_PROBLEM_JSON,
};
pub use context::{CtxError, RequestCtx};
pub use http::client::TracedClient;
pub use http::deadline::with_deadline;
