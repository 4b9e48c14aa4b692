use thiserror::Error;

/// Why a credential was rejected. Every variant is an authentication failure
/// from the caller's point of view and maps to 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed credential: {0}")]
    MalformedCredential(&'static str),

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("authentication authority unavailable: {0}")]
    AuthorityUnavailable(String),

    #[error("credential is missing the identity claim")]
    ClaimsMissing,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MalformedCredential(_) => "AUTH_MALFORMED_CREDENTIAL",
            AuthError::InvalidCredential(_) => "AUTH_INVALID_CREDENTIAL",
            AuthError::AuthorityUnavailable(_) => "AUTH_AUTHORITY_UNAVAILABLE",
            AuthError::ClaimsMissing => "AUTH_CLAIMS_MISSING",
        }
    }

    /// Message safe to return to the caller.
    pub fn public_detail(&self) -> &'static str {
        match self {
            AuthError::MalformedCredential(why) => why,
            AuthError::InvalidCredential(_) => "invalid or expired token",
            AuthError::AuthorityUnavailable(_) => "token could not be verified",
            AuthError::ClaimsMissing => "token does not identify a user",
        }
    }
}
