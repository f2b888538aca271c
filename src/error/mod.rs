//! Error types for the Open API client.
//!
//! Errors are split by where they originate: local configuration problems
//! (never retried), signing failures, transport failures, structured errors
//! reported by the remote service, and response decoding problems.

mod mapping;

pub use mapping::{service_error_from_response, ErrorFields};

use thiserror::Error;

/// Top-level error type for the Open API client.
#[derive(Debug, Error)]
pub enum AcsError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Credential-related errors.
    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// Request signing errors.
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// Network and transport errors.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Error reported by the remote service.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Response decoding errors.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl AcsError {
    /// Returns true if the error is retryable at the transport level.
    ///
    /// Service errors are never retryable here: server faults are retried on
    /// the raw HTTP status before they are classified.
    pub fn is_retryable(&self) -> bool {
        match self {
            AcsError::Network(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns the HTTP status code if the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AcsError::Service(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns the service or SDK error code.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            AcsError::Service(e) => Some(e.code.as_str()),
            AcsError::Configuration(e) => Some(e.code()),
            _ => None,
        }
    }

    /// Returns the request id reported by the service, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            AcsError::Service(e) => e.request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns true if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AcsError::Configuration(_))
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No profile is set and the call did not supply every routing input.
    #[error("No active profile found: {missing} must be supplied when the client has no profile")]
    NoActiveProfile {
        /// The input that could not be determined.
        missing: &'static str,
    },

    /// No endpoint is known for the region and product.
    #[error("Can not find endpoint to access: product '{product}' in region '{region}'")]
    EndpointNotFound {
        /// The region id.
        region: String,
        /// The product name.
        product: String,
    },

    /// The endpoint table could not be loaded.
    #[error("Invalid endpoint table: {message}")]
    InvalidEndpointTable {
        /// Details about the failure.
        message: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfiguration {
        /// The configuration field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigurationError {
    /// Returns the SDK error code.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigurationError::NoActiveProfile { .. } => "SDK.InvalidProfile",
            ConfigurationError::EndpointNotFound { .. } => "SDK.InvalidRegionId",
            ConfigurationError::InvalidEndpointTable { .. }
            | ConfigurationError::InvalidConfiguration { .. } => "SDK.InvalidConfiguration",
        }
    }
}

/// Credential-related errors.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// A required environment variable is not set.
    #[error("Credentials not found: environment variable {variable} is not set")]
    NotFound {
        /// The variable name.
        variable: String,
    },

    /// Credentials are invalid.
    #[error("Invalid credentials: {message}")]
    Invalid {
        /// Details about why credentials are invalid.
        message: String,
    },
}

/// Request signing errors.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Signature calculation failed.
    #[error("Signature calculation failed: {message}")]
    CalculationFailed {
        /// Details about the calculation error.
        message: String,
    },

    /// The signer cannot sign with this kind of credential.
    #[error("Signer {signer} does not support {credential} credentials")]
    UnsupportedCredential {
        /// The signer name.
        signer: &'static str,
        /// The credential kind.
        credential: &'static str,
    },

    /// A `[Name]` placeholder in a resource path has no value.
    #[error("Missing path parameter '{name}' for pattern '{pattern}'")]
    MissingPathParameter {
        /// The placeholder name.
        name: String,
        /// The URI pattern.
        pattern: String,
    },
}

/// Network and transport errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message.
        message: String,
    },

    /// Request timed out.
    #[error("Request timed out: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    TlsError {
        /// Error message.
        message: String,
    },

    /// The request could not be turned into a transport request.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },
}

impl NetworkError {
    /// Returns true if the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. }
        )
    }
}

/// A structured failure reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} (HTTP {status}): {message}")]
pub struct ServiceError {
    /// Server-reported message.
    pub message: String,
    /// Server-reported error code.
    pub code: String,
    /// HTTP status of the response.
    pub status: u16,
    /// Request correlation id.
    pub request_id: Option<String>,
    /// Host id, when the service reports one.
    pub host_id: Option<String>,
}

impl ServiceError {
    /// Returns true for 4xx responses.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns true for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Response decoding errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The payload could not be deserialized into the requested type.
    #[error("Failed to deserialize payload: {message}")]
    Deserialize {
        /// Error message.
        message: String,
    },

    /// The payload has no structured value (raw text or malformed XML).
    #[error("Payload is not structured data")]
    Unstructured,
}
