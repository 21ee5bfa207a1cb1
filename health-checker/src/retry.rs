use crate::models::{ErrorCategory, HealthCheckResult};
use std::future::Future;
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(base_backoff: Duration) -> Self {
        Self { base_backoff }
    }

    /// `base * 2^attempt_index`, saturating instead of overflowing.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor)
    }

    pub fn is_retryable(result: &HealthCheckResult) -> bool {
        match result.error_category {
            ErrorCategory::Timeout
            | ErrorCategory::ConnectionFailure
            | ErrorCategory::DnsFailure
            | ErrorCategory::TlsError
            | ErrorCategory::RateLimit => true,
            ErrorCategory::HttpError => result
                .http_status
                .is_some_and(|status| status >= 500 || status == 408),
            _ => false,
        }
    }

    /// Runs up to `max_retries + 1` attempts. `attempt` receives the 1-based
    /// attempt number. The last result is returned with `attempts` set to the
    /// number of attempts made.
    pub async fn run<F, Fut>(&self, max_retries: u32, mut attempt: F) -> HealthCheckResult
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = HealthCheckResult>,
    {
        let max_attempts = max_retries.saturating_add(1);
        let mut attempt_index = 0;

        loop {
            let mut result = attempt(attempt_index + 1).await;
            result.attempts = attempt_index + 1;

            if result.is_up() {
                return result;
            }

            if !Self::is_retryable(&result) {
                debug!(
                    target_id = %result.target_id,
                    category = ?result.error_category,
                    "non-retryable outcome"
                );
                return result;
            }

            if attempt_index + 1 >= max_attempts {
                return result;
            }

            let delay = self.backoff_delay(attempt_index);
            warn!(
                target_id = %result.target_id,
                attempt = attempt_index + 1,
                category = ?result.error_category,
                backoff = ?delay,
                "retryable failure, backing off"
            );
            time::sleep(delay).await;
            attempt_index += 1;
        }
    }
}
