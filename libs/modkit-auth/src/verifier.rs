use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::{AuthError, VerifiedIdentity};

/// Validates a bearer credential and yields the identity it was issued for.
///
/// Implementations are selected once at startup and shared across requests.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Runs before any crypto or network work so malformed headers fail fast.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MalformedCredential("authorization header is missing"))?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential("authorization header is not valid text"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MalformedCredential("expected 'Bearer <token>'"))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedCredential("expected 'Bearer <token>'"));
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedCredential("bearer token is empty or malformed"));
    }
    Ok(token)
}
