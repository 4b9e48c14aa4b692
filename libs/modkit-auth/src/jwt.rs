use anyhow::bail;
use async_trait::async_trait;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::{AuthError, TokenVerifier, VerifiedIdentity};

/// Claims read from a locally verified token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Identity key; older issuers put it under `user_id`.
    #[serde(default, alias = "user_id", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: u64,
}

/// HS256 verification against a shared secret. No network round trip.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(settings: &JwtSettings) -> anyhow::Result<Self> {
        if settings.secret.trim().is_empty() {
            bail!("auth.secret must not be empty");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = settings.leeway_secs;
        match &settings.audience {
            Some(aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &settings.issuer {
            validation.set_issuer(&[iss.as_str()]);
        }

        Ok(Self {
            key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "token expired",
                    ErrorKind::InvalidSignature => "signature mismatch",
                    ErrorKind::InvalidAlgorithm => "unsupported signing algorithm",
                    ErrorKind::InvalidAudience => "audience mismatch",
                    ErrorKind::InvalidIssuer => "issuer mismatch",
                    _ => "token could not be decoded",
                };
                tracing::debug!(error = %e, reason, "jwt rejected");
                AuthError::InvalidCredential(reason.to_string())
            })?;

        let claims = data.claims;
        let subject = claims
            .sub
            .filter(|s| !s.trim().is_empty())
            .ok_or(AuthError::ClaimsMissing)?;
        Ok(VerifiedIdentity::new(subject, claims.role))
    }
}
