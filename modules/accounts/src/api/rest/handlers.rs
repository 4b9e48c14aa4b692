use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Path,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Extension,
};
use modkit::RequestCtx;
use modkit_auth::Authenticated;
use tracing::{debug, info};

use crate::api::rest::dto::{AccountDto, CreateAccountReq};
use crate::api::rest::error::{self, ProblemTarget};
use crate::contract::model::AccountId;
use crate::domain::service::Service;

/// Create the caller's account. The identity key comes from the credential.
pub async fn create_account(
    Extension(svc): Extension<Arc<Service>>,
    Extension(ctx): Extension<RequestCtx>,
    Authenticated(identity): Authenticated,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = ProblemTarget::new(uri.path(), &headers);

    let Ok(id) = AccountId::parse(identity.subject()) else {
        return error::unusable_identity(&target);
    };

    if body.is_empty() {
        return error::bad_body("request body is empty", &target).into_response();
    }
    let req: CreateAccountReq = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "undecodable create-account body");
            return error::bad_body("failed to decode request body", &target).into_response();
        }
    };

    let new_account = match req.into_new_account(svc.today()) {
        Ok(n) => n,
        Err(violations) => return error::validation(&violations, &target).into_response(),
    };

    info!(account_id = %id, "creating account");
    match svc.create_account(&ctx, id, new_account).await {
        Ok(view) => (StatusCode::CREATED, Json(AccountDto::from(view))).into_response(),
        Err(e) => error::map_domain_error(&e, &target).into_response(),
    }
}

/// Read an account by identity key.
pub async fn get_account(
    Extension(svc): Extension<Arc<Service>>,
    Extension(ctx): Extension<RequestCtx>,
    Authenticated(_identity): Authenticated,
    Path(identity_key): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let target = ProblemTarget::new(uri.path(), &headers);

    let id = match AccountId::parse(&identity_key) {
        Ok(id) => id,
        Err(e) => return error::bad_identity_key(e.to_string(), &target).into_response(),
    };

    match svc.get_account(&ctx, &id).await {
        Ok(view) => Json(AccountDto::from(view)).into_response(),
        Err(e) => error::map_domain_error(&e, &target).into_response(),
    }
}

/// `get-account` called without a key.
pub async fn get_account_without_key(
    Authenticated(_identity): Authenticated,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let target = ProblemTarget::new(uri.path(), &headers);
    error::bad_identity_key("identity key is required", &target).into_response()
}
