//! Bearer-token authentication for ModKit services.
//!
//! A deployment picks one [`TokenVerifier`] at startup from [`AuthConfig`]:
//! local HS256 verification ([`JwtVerifier`]) or delegation to a remote
//! authority ([`RemoteVerifier`]). The [`require_auth`] middleware runs it for
//! each request and stores the resulting [`VerifiedIdentity`] in the request
//! extensions, where handlers read it through the [`Authenticated`] extractor.

pub mod config;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod remote;
pub mod verifier;

pub use config::{build_verifier, AuthConfig, JwtSettings, RemoteSettings};
pub use error::AuthError;
pub use identity::{Authenticated, VerifiedIdentity};
pub use jwt::{JwtClaims, JwtVerifier};
pub use middleware::{require_auth, AuthState};
pub use remote::{AuthorityResponse, RemoteVerifier};
pub use verifier::{bearer_token, TokenVerifier};
