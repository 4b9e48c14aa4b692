//! Per-request processing context: a fixed deadline plus a cancellation token.
//!
//! Every suspending call made on behalf of a request (remote token checks,
//! database probes, writes, commits) goes through [`RequestCtx::run`] so that
//! it aborts as soon as the deadline passes or the request is cancelled.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a request context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CtxError {
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct RequestCtx {
    deadline: Instant,
    token: CancellationToken,
}

impl RequestCtx {
    /// Context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            token: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `Ok` while the context is live; otherwise the reason it is done.
    pub fn check(&self) -> Result<(), CtxError> {
        if Instant::now() >= self.deadline {
            return Err(CtxError::DeadlineExceeded);
        }
        if self.token.is_cancelled() {
            return Err(CtxError::Cancelled);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the deadline passes or the token is
    /// cancelled first; in that case `fut` is dropped.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, CtxError>
    where
        F: Future,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(self.cause()),
            _ = tokio::time::sleep_until(self.deadline) => Err(CtxError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    fn cause(&self) -> CtxError {
        if Instant::now() >= self.deadline {
            CtxError::DeadlineExceeded
        } else {
            CtxError::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_returns_output_before_deadline() {
        let ctx = RequestCtx::with_timeout(Duration::from_secs(5));
        let out = ctx.run(async { 7 }).await;
        assert_eq!(out, Ok(7));
        assert!(ctx.check().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_reports_deadline_exceeded() {
        let ctx = RequestCtx::with_timeout(Duration::from_millis(100));
        let out = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(out, Err(CtxError::DeadlineExceeded));
        assert_eq!(ctx.check(), Err(CtxError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_distinguished_from_deadline() {
        let ctx = RequestCtx::with_timeout(Duration::from_secs(30));
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let out = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(out, Err(CtxError::Cancelled));
        assert_eq!(ctx.check(), Err(CtxError::Cancelled));
    }

    #[tokio::test]
    async fn run_refuses_to_start_on_a_done_context() {
        let ctx = RequestCtx::with_timeout(Duration::from_secs(5));
        ctx.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let out = ctx
            .run(async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
            })
            .await;
        assert_eq!(out, Err(CtxError::Cancelled));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }
}
