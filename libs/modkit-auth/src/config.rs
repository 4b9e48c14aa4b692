use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

use crate::{JwtVerifier, RemoteVerifier, TokenVerifier};

/// Which verification strategy guards the protected routes.
///
/// ```yaml
/// auth:
///   mode: jwt
///   secret: "${APP_JWT_SECRET}"
///   audience: accounts
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AuthConfig {
    Jwt(JwtSettings),
    Remote(RemoteSettings),
}

/// Written in place of the signing secret whenever settings are printed.
const REDACTED: &str = "<redacted>";

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    #[serde(serialize_with = "redact")]
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp`.
    #[serde(default)]
    pub leeway_secs: u64,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &REDACTED)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

fn redact<S: Serializer>(_secret: &str, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(REDACTED)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    pub url: String,
    #[serde(with = "humantime_serde", default = "default_remote_timeout")]
    pub timeout: Duration,
}

fn default_remote_timeout() -> Duration {
    Duration::from_secs(5)
}

impl AuthConfig {
    pub fn mode(&self) -> &'static str {
        match self {
            AuthConfig::Jwt(_) => "jwt",
            AuthConfig::Remote(_) => "remote",
        }
    }
}

/// Build the verifier selected by configuration. Misconfiguration is fatal at
/// startup, never discovered on the first request.
pub fn build_verifier(cfg: &AuthConfig) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    let verifier: Arc<dyn TokenVerifier> = match cfg {
        AuthConfig::Jwt(s) => Arc::new(JwtVerifier::new(s)?),
        AuthConfig::Remote(s) => Arc::new(RemoteVerifier::new(s)?),
    };
    tracing::info!(mode = cfg.mode(), "token verifier configured");
    Ok(verifier)
}
