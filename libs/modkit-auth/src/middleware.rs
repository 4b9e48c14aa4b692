use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::WWW_AUTHENTICATE, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use modkit::{request_timeout, unauthorized, CtxError, ProblemResponse, RequestCtx};

use crate::{bearer_token, AuthError, TokenVerifier};

#[derive(Clone)]
pub struct AuthState {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthState {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

/// Reject the request unless it carries a bearer token the configured
/// verifier accepts.
///
/// When a [`RequestCtx`] is present the verification is bounded by it, so a
/// slow authority surfaces as a timeout rather than a hung request.
pub async fn require_auth(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    let token = match bearer_token(req.headers()) {
        Ok(t) => t.to_string(),
        Err(e) => return auth_failure(e, &path),
    };

    let outcome = match req.extensions().get::<RequestCtx>().cloned() {
        Some(ctx) => ctx.run(state.verifier.verify(&token)).await,
        None => Ok(state.verifier.verify(&token).await),
    };

    match outcome {
        Ok(Ok(identity)) => {
            tracing::debug!(subject = %identity.subject(), "request authenticated");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Ok(Err(e)) => auth_failure(e, &path),
        Err(e) => deadline_failure(e, &path),
    }
}

fn auth_failure(err: AuthError, path: &str) -> Response {
    tracing::warn!(error = %err, code = err.code(), path, "authentication failed");
    let problem = unauthorized(err.public_detail())
        .with_code(err.code())
        .with_instance(path);

    let mut resp = ProblemResponse(problem).into_response();
    resp.headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    resp
}

fn deadline_failure(err: CtxError, path: &str) -> Response {
    tracing::warn!(error = %err, path, "authentication did not finish in time");
    let (code, detail) = match err {
        CtxError::DeadlineExceeded => ("REQUEST_DEADLINE_EXCEEDED", "request deadline exceeded"),
        CtxError::Cancelled => ("REQUEST_CANCELLED", "request was cancelled"),
    };
    ProblemResponse(request_timeout(detail).with_code(code).with_instance(path)).into_response()
}
