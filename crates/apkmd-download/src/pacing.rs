//! Cancellable delays and fetches.
//!
//! Every suspension point of a run goes through a `Pacer`, so a single
//! `CancellationToken` stops the run at the next await.

use std::future::Future;
use std::time::Duration;

use apkmd_core::{DownloadError, DownloadResult};
use tokio_util::sync::CancellationToken;

/// Races delays and fetches against a cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Pacer {
    cancel: CancellationToken,
}

impl Pacer {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Fail with `Cancelled` if the token has fired.
    pub fn check(&self) -> DownloadResult<()> {
        if self.cancel.is_cancelled() {
            Err(DownloadError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `delay` unless cancelled first.
    pub async fn sleep(&self, delay: Duration) -> DownloadResult<()> {
        if delay.is_zero() {
            return self.check();
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(DownloadError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Drive `fut` to completion unless cancelled first.
    pub async fn run<F>(&self, fut: F) -> DownloadResult<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(DownloadError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_sleep_returns_immediately() {
        let pacer = Pacer::default();
        assert!(pacer.sleep(Duration::ZERO).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_sleep() {
        let token = CancellationToken::new();
        let pacer = Pacer::new(token.clone());
        token.cancel();

        let result = pacer.sleep(Duration::from_secs(3600)).await;
        assert_eq!(result, Err(DownloadError::Cancelled));
        assert_eq!(pacer.check(), Err(DownloadError::Cancelled));
    }

    #[tokio::test]
    async fn test_run_returns_future_output() {
        let pacer = Pacer::default();
        let value = pacer.run(async { 42 }).await;
        assert_eq!(value, Ok(42));
    }

    #[tokio::test]
    async fn test_run_cancelled() {
        let token = CancellationToken::new();
        let pacer = Pacer::new(token.clone());
        token.cancel();

        let result = pacer.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(DownloadError::Cancelled)));
    }
}
