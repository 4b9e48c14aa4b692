use std::time::Duration;

use async_trait::async_trait;
use modkit::TracedClient;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::RemoteSettings;
use crate::{AuthError, TokenVerifier, VerifiedIdentity};

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Verdict returned by the authentication authority.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityResponse {
    pub valid: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Delegates verification to a remote authority over HTTP.
///
/// Identity and role are taken from the authority's answer; the token itself
/// is never decoded here.
pub struct RemoteVerifier {
    client: TracedClient,
    url: String,
    timeout: Duration,
}

impl RemoteVerifier {
    pub fn new(settings: &RemoteSettings) -> anyhow::Result<Self> {
        let url = url::Url::parse(&settings.url)
            .map_err(|e| anyhow::anyhow!("invalid auth.url '{}': {}", settings.url, e))?;
        Ok(Self::with_client(
            TracedClient::default(),
            url.to_string(),
            settings.timeout,
        ))
    }

    pub fn with_client(client: TracedClient, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TokenVerifier for RemoteVerifier {
    #[instrument(name = "auth.remote.verify", skip_all, fields(authority = %self.url))]
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let resp = self
            .client
            .post_json(&self.url, &VerifyRequest { token }, self.timeout)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "authority call failed");
                AuthError::AuthorityUnavailable(e.to_string())
            })?;

        let status = resp.status();
        if status.is_server_error() {
            tracing::warn!(%status, "authority returned a server error");
            return Err(AuthError::AuthorityUnavailable(format!(
                "authority answered {status}"
            )));
        }
        if !status.is_success() {
            return Err(AuthError::InvalidCredential(format!(
                "authority answered {status}"
            )));
        }

        let verdict: AuthorityResponse = resp.json().await.map_err(|e| {
            tracing::warn!(error = %e, "authority response could not be parsed");
            AuthError::AuthorityUnavailable("malformed authority response".to_string())
        })?;

        if !verdict.valid {
            return Err(AuthError::InvalidCredential(
                verdict
                    .message
                    .unwrap_or_else(|| "rejected by authority".to_string()),
            ));
        }

        let subject = verdict
            .user_id
            .filter(|s| !s.trim().is_empty())
            .ok_or(AuthError::ClaimsMissing)?;
        Ok(VerifiedIdentity::new(subject, verdict.role))
    }
}
