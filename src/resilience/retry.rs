//! Retry policy implementation.

use crate::error::AcsError;
use crate::transport::HttpResponse;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of send attempts, the first one included. 0 behaves as 1.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Add jitter to backoff.
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with the given number of attempts.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the initial backoff duration.
    pub fn with_initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Set the maximum backoff duration.
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Set the backoff multiplier.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// A single attempt, no retry.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Retry immediately, without backoff.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
            use_jitter: false,
        }
    }
}

/// Retry policy that re-runs a send until it stops failing at the transport level.
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_retries.max(1)
    }

    /// Execute an attempt function with retry logic.
    ///
    /// `attempt_fn` receives the 1-based attempt number and must build a fresh
    /// request each time. A response with status >= 500 or a retryable
    /// transport error is retried until [`max_attempts`](Self::max_attempts)
    /// sends were made; the last outcome is returned as is.
    pub async fn execute<F, Fut>(&self, mut attempt_fn: F) -> Result<HttpResponse, AcsError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<HttpResponse, AcsError>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            let outcome = attempt_fn(attempt).await;

            let retryable = match &outcome {
                Ok(response) => response.is_server_error(),
                Err(error) => error.is_retryable(),
            };

            if !retryable {
                if attempt > 1 {
                    debug!(attempt = attempt, "Request settled after retry");
                }
                return outcome;
            }

            if attempt >= max_attempts {
                if max_attempts > 1 {
                    warn!(
                        attempts = attempt,
                        max_attempts = max_attempts,
                        "Request still failing after all retries"
                    );
                }
                return outcome;
            }

            let backoff = self.calculate_backoff(attempt - 1);
            match &outcome {
                Ok(response) => debug!(
                    attempt = attempt,
                    status = response.status,
                    backoff_ms = backoff.as_millis() as u64,
                    "Server fault, retrying"
                ),
                Err(error) => debug!(
                    attempt = attempt,
                    error = %error,
                    backoff_ms = backoff.as_millis() as u64,
                    "Transport failure, retrying"
                ),
            }

            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
            attempt += 1;
        }
    }

    /// Calculate backoff duration after the given (0-based) failed attempt.
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = self.config.initial_backoff.as_millis() as f64;
        let multiplied = base * self.config.backoff_multiplier.powi(attempt as i32);
        let capped = multiplied.min(self.config.max_backoff.as_millis() as f64);

        let final_ms = if self.config.use_jitter && capped > 0.0 {
            // Half fixed, half random.
            let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
            capped * (0.5 + jitter * 0.5)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }

    /// Get the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish()
    }
}
