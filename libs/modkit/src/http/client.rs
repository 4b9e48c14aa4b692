//! Traced HTTP client.
//!
//! Wraps `reqwest::Client` so that every outgoing call runs inside an
//! `outgoing_http` span carrying method, url, status and latency.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{field::Empty, Instrument, Level};

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Execute a built request inside an `outgoing_http` span.
    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = Empty,
            latency_ms = Empty,
            error = Empty,
            otel.kind = "client",
        );

        let started = Instant::now();
        let result = self.inner.execute(req).instrument(span.clone()).await;
        span.record("latency_ms", started.elapsed().as_millis() as u64);

        match &result {
            Ok(resp) => {
                let status = resp.status();
                span.record("http.status_code", status.as_u16());
                if status.is_client_error() || status.is_server_error() {
                    span.record("error", true);
                }
            }
            Err(e) => {
                span.record("error", true);
                tracing::debug!(parent: &span, error = %e, "outgoing request failed");
            }
        }
        result
    }

    /// POST a JSON body, giving up after `timeout`.
    pub async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> reqwest::Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let req = self.inner.post(url).json(body).timeout(timeout).build()?;
        self.execute(req).await
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
