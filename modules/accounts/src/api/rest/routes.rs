use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Router,
};
use modkit::with_deadline;
use modkit_auth::{require_auth, AuthState, TokenVerifier};

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub const CREATE_ACCOUNT_PATH: &str = "/api/v1/account/create-account";
pub const GET_ACCOUNT_PATH: &str = "/api/v1/account/get-account/{identity_key}";
const GET_ACCOUNT_BASE: &str = "/api/v1/account/get-account";
const GET_ACCOUNT_BASE_SLASH: &str = "/api/v1/account/get-account/";

/// Account routes. Every route runs under the request deadline first, then
/// authentication, then the handler.
pub fn register_routes(
    service: Arc<Service>,
    verifier: Arc<dyn TokenVerifier>,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .route(CREATE_ACCOUNT_PATH, post(handlers::create_account))
        .route(GET_ACCOUNT_PATH, get(handlers::get_account))
        .route(GET_ACCOUNT_BASE, get(handlers::get_account_without_key))
        .route(GET_ACCOUNT_BASE_SLASH, get(handlers::get_account_without_key))
        .route_layer(from_fn_with_state(AuthState::new(verifier), require_auth))
        .route_layer(from_fn_with_state(request_timeout, with_deadline))
        .layer(Extension(service))
}
