use axum::{http::Uri, response::Json};
use modkit::{not_found, ProblemResponse};
use serde_json::{json, Value};

/// Liveness only; does not touch the database.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Problem-details 404 for paths no module registered.
pub async fn route_not_found(uri: Uri) -> ProblemResponse {
    not_found(format!("no route for {}", uri.path()))
        .with_code("ROUTE_NOT_FOUND")
        .with_instance(uri.path())
        .into()
}
