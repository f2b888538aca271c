//! Resilience layer for API calls.
//!
//! Retries are transport-level only: server faults (status >= 500) and
//! connection failures. Client errors are never retried.

mod retry;

pub use retry::{RetryConfig, RetryPolicy};
