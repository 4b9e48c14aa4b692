//! HTTP ingress: wraps module routers with the shared middleware stack and
//! serves them until shutdown.
//!
//! Middleware order (outermost to innermost):
//! SetRequestId -> PropagateRequestId -> Trace -> Timeout -> CORS -> BodyLimit
//! -> module routes

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Request, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{field::Empty, Span};

pub mod config;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;

/// Mount `routes` next to `/health` and wrap everything in the ingress stack.
///
/// `request_timeout` is the outer safety net; per-request deadlines inside the
/// modules are expected to fire first.
pub fn build_router(
    routes: Router,
    cfg: &ApiIngressConfig,
    request_timeout: Option<Duration>,
) -> Router {
    let mut router = Router::new()
        .route("/health", get(web::health_check))
        .merge(routes)
        .fallback(web::route_not_found)
        .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    if let Some(timeout) = request_timeout {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let rid = request_id::request_id_of(req.headers());
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                path = %req.uri().path(),
                version = ?req.version(),
                request_id = %rid,
                status = Empty,
                latency_ms = Empty
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
            span.record("status", res.status().as_u16());
            span.record("latency_ms", latency.as_millis() as u64);
            tracing::debug!(parent: span, "request completed");
        });

    router
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id::X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(
            request_id::X_REQUEST_ID,
            request_id::NanoRequestId,
        ))
}

/// Bind `addr` and serve until `cancel` fires, then drain in-flight requests.
pub async fn serve(router: Router, addr: SocketAddr, cancel: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(listener, router, cancel).await
}

pub async fn serve_on(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "HTTP server bound");

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
