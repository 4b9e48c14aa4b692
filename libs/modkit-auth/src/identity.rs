use axum::{extract::FromRequestParts, http::request::Parts};
use modkit::{internal_error, ProblemResponse};

/// Identity established by a [`TokenVerifier`](crate::TokenVerifier) for the
/// current request. Lives in the request extensions; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    subject: String,
    role: Option<String>,
}

impl VerifiedIdentity {
    pub fn new(subject: impl Into<String>, role: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// The identity key the credential was issued for.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

/// Extractor for handlers behind [`require_auth`](crate::require_auth).
///
/// A missing identity means the route was wired without the auth layer; the
/// request is answered with 500 instead of being served unauthenticated.
#[derive(Debug, Clone)]
pub struct Authenticated(pub VerifiedIdentity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<VerifiedIdentity>() {
            Some(identity) => Ok(Authenticated(identity.clone())),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "route requires authentication but no verified identity is attached"
                );
                Err(internal_error("authentication context missing")
                    .with_code("AUTH_CONTEXT_MISSING")
                    .with_instance(parts.uri.path())
                    .into())
            }
        }
    }
}
