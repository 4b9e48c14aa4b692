use axum::http::{HeaderMap, HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Length of generated ids; nanoid's default alphabet is URL- and header-safe.
const GENERATED_LEN: usize = 21;

/// Generates an id for requests that arrive without `x-request-id`.
#[derive(Clone, Copy, Default)]
pub struct NanoRequestId;

impl MakeRequestId for NanoRequestId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!(GENERATED_LEN);
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// The request id as text, or `n/a` when absent or not valid UTF-8.
pub fn request_id_of(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a")
}
