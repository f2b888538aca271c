//! Alibaba Cloud Open API client.
//!
//! Async client for the RPC-style and ROA-style Alibaba Cloud (ACS) Open API.
//!
//! # Features
//!
//! - **Signing**: RPC query-string signatures and ROA header signatures with
//!   HMAC-SHA1, HMAC-SHA256 or bearer tokens
//! - **Endpoints**: Built-in `(region, product)` table with user overrides
//! - **Resilience**: Re-signed retries of server faults with exponential backoff
//! - **Batches**: Bounded-concurrency dispatch with per-request callbacks
//! - **Responses**: JSON and XML bodies decoded by `Content-Type`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aliyun_openapi::{AcsClient, AcsRequest, Credential, Profile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), aliyun_openapi::AcsError> {
//!     let profile = Profile::new("cn-hangzhou", Credential::access_key("id", "secret"));
//!     let client = AcsClient::new(profile)?;
//!
//!     let request = AcsRequest::rpc("Ecs", "2014-05-26", "DescribeRegions");
//!     let payload = client.dispatch(&request).await?;
//!
//!     println!("Request id: {:?}", payload.request_id());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod mocks;
pub mod profile;
pub mod request;
pub mod resilience;
pub mod response;
pub mod signing;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use client::{AcsClient, AcsClientBuilder, BatchOptions, BatchSummary, DispatchOptions};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use credentials::Credential;
pub use endpoint::{EndpointResolver, EndpointResolverBuilder};
pub use error::{
    AcsError, ConfigurationError, CredentialsError, NetworkError, ResponseError, ServiceError,
    SigningError,
};
pub use profile::{Profile, ProfileBuilder};
pub use request::{AcsRequest, ApiStyle};
pub use resilience::RetryConfig;
pub use response::{parse_response, Payload};
pub use signing::{BearerTokenSigner, HmacSha1Signer, HmacSha256Signer, Signer};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{Format, HttpMethod, Protocol};

/// Result type for Open API operations.
pub type Result<T> = std::result::Result<T, AcsError>;
