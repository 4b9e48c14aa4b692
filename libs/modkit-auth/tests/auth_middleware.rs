use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use modkit::with_deadline;
use modkit_auth::{require_auth, AuthError, AuthState, Authenticated, TokenVerifier, VerifiedIdentity};
use tower::ServiceExt;

/// Accepts `good-<subject>`, rejects everything else, and can be told to hang.
struct StubVerifier {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StubVerifier {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match token.strip_prefix("good-") {
            Some(subject) => Ok(VerifiedIdentity::new(subject, Some("user".into()))),
            None => Err(AuthError::InvalidCredential("unknown token".into())),
        }
    }
}

async fn whoami(Authenticated(id): Authenticated) -> String {
    id.subject().to_string()
}

fn app(verifier: Arc<StubVerifier>) -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .route_layer(from_fn_with_state(AuthState::new(verifier), require_auth))
        .route_layer(from_fn_with_state(Duration::from_millis(50), with_deadline))
}

fn request(auth: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri("/whoami");
    if let Some(v) = auth {
        b = b.header(header::AUTHORIZATION, v);
    }
    b.body(Body::empty()).unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn valid_token_reaches_the_handler() {
    let resp = app(StubVerifier::new())
        .oneshot(request(Some("Bearer good-U1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"U1");
}

#[tokio::test]
async fn missing_header_fails_without_calling_the_verifier() {
    let verifier = StubVerifier::new();
    let resp = app(verifier.clone()).oneshot(request(None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/problem+json"
    );
    let body = json_body(resp).await;
    assert_eq!(body["code"], "AUTH_MALFORMED_CREDENTIAL");
    assert_eq!(body["instance"], "/whoami");
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_token_is_401_with_generic_detail() {
    let resp = app(StubVerifier::new())
        .oneshot(request(Some("Bearer forged")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "AUTH_INVALID_CREDENTIAL");
    assert_eq!(body["detail"], "invalid or expired token");
}

#[tokio::test]
async fn slow_verification_is_bounded_by_the_request_deadline() {
    let resp = app(StubVerifier::slow(Duration::from_secs(5)))
        .oneshot(request(Some("Bearer good-U1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "REQUEST_DEADLINE_EXCEEDED");
}

#[tokio::test]
async fn handler_without_auth_layer_is_an_internal_error() {
    let app = Router::new().route("/whoami", get(whoami));
    let resp = app.oneshot(request(Some("Bearer good-U1"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "AUTH_CONTEXT_MISSING");
}
