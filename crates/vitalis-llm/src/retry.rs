//! Fixed-delay retry on provider rate limiting.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use vitalis_core::LlmError;

pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// Suspends the caller between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry budget and the fixed wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: DEFAULT_RETRIES, delay: DEFAULT_DELAY }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Runs `op`, retrying only on rate-limit failures while budget remains.
    ///
    /// Every other error, and the last rate-limit error once the budget is
    /// spent, is returned unchanged.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut remaining = self.retries;
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() && remaining > 0 => {
                    warn!(
                        attempt,
                        delay_ms = self.delay.as_millis() as u64,
                        "Quota exceeded, retrying after delay: {}",
                        e
                    );
                    sleeper.sleep(self.delay).await;
                    remaining -= 1;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
