//! Client configuration.
//!
//! [`ClientConfig`] carries the transport and retry settings of a client. It
//! is independent of the [`Profile`](crate::Profile), which holds the routing
//! and signing defaults.

use crate::error::{AcsError, ConfigurationError};
use crate::resilience::RetryConfig;
use std::time::Duration;

/// Environment variable overriding the maximum number of send attempts.
pub const MAX_RETRIES_VAR: &str = "ALIYUN_OPENAPI_MAX_RETRIES";
/// Environment variable enabling or disabling automatic retry.
pub const AUTO_RETRY_VAR: &str = "ALIYUN_OPENAPI_AUTO_RETRY";
/// Environment variable overriding the connect timeout, in milliseconds.
pub const CONNECT_TIMEOUT_VAR: &str = "ALIYUN_OPENAPI_CONNECT_TIMEOUT_MS";
/// Environment variable overriding the read timeout, in milliseconds.
pub const READ_TIMEOUT_VAR: &str = "ALIYUN_OPENAPI_READ_TIMEOUT_MS";
/// Environment variable overriding the User-Agent.
pub const USER_AGENT_VAR: &str = "ALIYUN_OPENAPI_USER_AGENT";

/// Default User-Agent sent by the reqwest transport.
pub fn default_user_agent() -> String {
    format!("aliyun-openapi-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Read timeout for individual requests.
    pub read_timeout: Duration,

    /// Retry server faults (status >= 500) and connection failures.
    pub auto_retry: bool,

    /// Retry settings. `retry.max_retries` is the total number of send attempts.
    pub retry: RetryConfig,

    /// User-Agent header value.
    pub user_agent: String,

    /// Verify SSL certificates.
    pub verify_ssl: bool,

    /// Maximum idle connections kept per host.
    pub max_idle_per_host: usize,

    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            auto_retry: true,
            retry: RetryConfig::default(),
            user_agent: default_user_agent(),
            verify_ssl: true,
            max_idle_per_host: 32,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for client configuration.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    auto_retry: Option<bool>,
    max_retries: Option<u32>,
    retry: Option<RetryConfig>,
    user_agent: Option<String>,
    verify_ssl: Option<bool>,
    max_idle_per_host: Option<usize>,
    idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Enable or disable automatic retry.
    pub fn auto_retry(mut self, enabled: bool) -> Self {
        self.auto_retry = Some(enabled);
        self
    }

    /// Set the total number of send attempts.
    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.max_retries = Some(attempts);
        self
    }

    /// Replace the retry settings.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Set the User-Agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enable or disable SSL verification.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Set the maximum idle connections per host.
    pub fn max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = Some(max);
        self
    }

    /// Set the idle connection timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var(MAX_RETRIES_VAR) {
            if let Ok(attempts) = val.parse() {
                self.max_retries = Some(attempts);
            }
        }
        if let Ok(val) = std::env::var(AUTO_RETRY_VAR) {
            self.auto_retry = Some(val.to_lowercase() == "true");
        }
        if let Ok(val) = std::env::var(CONNECT_TIMEOUT_VAR) {
            if let Ok(ms) = val.parse() {
                self.connect_timeout = Some(Duration::from_millis(ms));
            }
        }
        if let Ok(val) = std::env::var(READ_TIMEOUT_VAR) {
            if let Ok(ms) = val.parse() {
                self.read_timeout = Some(Duration::from_millis(ms));
            }
        }
        if let Ok(val) = std::env::var(USER_AGENT_VAR) {
            if !val.is_empty() {
                self.user_agent = Some(val);
            }
        }

        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ClientConfig, AcsError> {
        let defaults = ClientConfig::default();

        let mut retry = self.retry.unwrap_or(defaults.retry);
        if let Some(attempts) = self.max_retries {
            retry.max_retries = attempts;
        }

        if retry.backoff_multiplier < 1.0 {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "backoff_multiplier".to_string(),
                message: "Backoff multiplier must be at least 1.0".to_string(),
            }
            .into());
        }

        let read_timeout = self.read_timeout.unwrap_or(defaults.read_timeout);
        if read_timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "read_timeout".to_string(),
                message: "Read timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(ClientConfig {
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            read_timeout,
            auto_retry: self.auto_retry.unwrap_or(defaults.auto_retry),
            retry,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            verify_ssl: self.verify_ssl.unwrap_or(defaults.verify_ssl),
            max_idle_per_host: self.max_idle_per_host.unwrap_or(defaults.max_idle_per_host),
            idle_timeout: self.idle_timeout.unwrap_or(defaults.idle_timeout),
        })
    }
}
