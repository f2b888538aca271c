//! Open API client.
//!
//! [`AcsClient`] fills request defaults from its [`Profile`], resolves the
//! endpoint, signs, sends through its transport (retrying server faults) and
//! decodes the response.

mod batch;

pub use batch::{BatchOptions, BatchSummary};

use crate::config::ClientConfig;
use crate::credentials::Credential;
use crate::endpoint::EndpointResolver;
use crate::error::{service_error_from_response, AcsError, ConfigurationError};
use crate::profile::Profile;
use crate::request::{AcsRequest, ResolvedRequest};
use crate::resilience::{RetryConfig, RetryPolicy};
use crate::response::{self, Payload};
use crate::signing::{sign_request, Signer, SigningContext};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-call overrides of the profile and client settings.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Signer to use instead of the profile's.
    pub signer: Option<Arc<dyn Signer>>,
    /// Credential to use instead of the profile's.
    pub credential: Option<Credential>,
    /// Override of [`ClientConfig::auto_retry`].
    pub auto_retry: Option<bool>,
    /// Override of the total number of send attempts.
    pub max_retries: Option<u32>,
}

impl DispatchOptions {
    /// Options that override nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this signer.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Use this credential.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Enable or disable automatic retry.
    pub fn with_auto_retry(mut self, auto_retry: bool) -> Self {
        self.auto_retry = Some(auto_retry);
        self
    }

    /// Set the total number of send attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Everything needed to sign one call.
struct CallInputs<'a> {
    resolved: ResolvedRequest<'a>,
    signer: &'a dyn Signer,
    credential: &'a Credential,
}

/// Open API client.
pub struct AcsClient {
    profile: Option<Arc<Profile>>,
    config: Arc<ClientConfig>,
    endpoints: Arc<EndpointResolver>,
    transport: Arc<dyn HttpTransport>,
}

impl AcsClient {
    /// Client for a profile, with default configuration, the built-in
    /// endpoint table and the reqwest transport.
    pub fn new(profile: Profile) -> Result<Self, AcsError> {
        Self::builder().profile(profile).build()
    }

    /// Client whose profile and configuration come from the environment.
    pub fn from_env() -> Result<Self, AcsError> {
        Self::builder()
            .profile(Profile::from_env()?)
            .config(ClientConfig::builder().from_env().build()?)
            .build()
    }

    /// Create a client builder.
    pub fn builder() -> AcsClientBuilder {
        AcsClientBuilder::new()
    }

    /// The profile, if any.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_deref()
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The endpoint resolver.
    pub fn endpoints(&self) -> &EndpointResolver {
        &self.endpoints
    }

    /// Dispatch a request with the profile defaults.
    pub async fn dispatch(&self, request: &AcsRequest) -> Result<Payload, AcsError> {
        self.dispatch_with(request, &DispatchOptions::default()).await
    }

    /// Dispatch a request.
    ///
    /// The request is re-signed for every attempt. While the response status is
    /// at least 500 (or the connection fails) and retry is enabled, it is sent
    /// again until `max_retries` sends were made. A final status outside
    /// `[200, 300)` becomes [`AcsError::Service`].
    pub async fn dispatch_with(
        &self,
        request: &AcsRequest,
        options: &DispatchOptions,
    ) -> Result<Payload, AcsError> {
        let inputs = self.prepare_call(request, options)?;
        let policy = RetryPolicy::new(self.retry_config(options));
        let transport = &self.transport;

        let response = policy
            .execute(|attempt| {
                let signed = sign_request(
                    &inputs.resolved,
                    inputs.signer,
                    inputs.credential,
                    &SigningContext::now(),
                );
                let action = request.action();
                let domain = inputs.resolved.domain.as_str();

                async move {
                    let http = signed?;
                    debug!(
                        action = action,
                        domain = domain,
                        method = %http.method,
                        attempt = attempt,
                        "Sending request"
                    );
                    let response = transport.send(http).await?;
                    debug!(
                        action = action,
                        attempt = attempt,
                        status = response.status,
                        "Received response"
                    );
                    Ok::<HttpResponse, AcsError>(response)
                }
            })
            .await?;

        let payload = self.parse_response(&response);
        if self.is_success(&response) {
            return Ok(payload);
        }

        let error = service_error_from_response(&payload, &response);
        debug!(
            action = request.action(),
            status = error.status,
            code = %error.code,
            request_id = error.request_id.as_deref().unwrap_or(""),
            "Request failed"
        );
        Err(AcsError::Service(error))
    }

    /// Build the signed transport request without sending it.
    pub fn build_http_request(
        &self,
        request: &AcsRequest,
        options: &DispatchOptions,
    ) -> Result<HttpRequest, AcsError> {
        let inputs = self.prepare_call(request, options)?;
        sign_request(
            &inputs.resolved,
            inputs.signer,
            inputs.credential,
            &SigningContext::now(),
        )
    }

    /// Decode a response body by its `Content-Type`.
    pub fn parse_response(&self, response: &HttpResponse) -> Payload {
        response::parse_response(response)
    }

    /// True when the status is in `[200, 300)`.
    pub fn is_success(&self, response: &HttpResponse) -> bool {
        response::is_success(response)
    }

    /// Former name of [`dispatch`](Self::dispatch).
    #[deprecated(note = "use `dispatch` instead")]
    pub async fn do_action(&self, request: &AcsRequest) -> Result<Payload, AcsError> {
        warn!("do_action is deprecated, use dispatch instead");
        self.dispatch(request).await
    }

    /// Former name of [`dispatch_with`](Self::dispatch_with).
    #[deprecated(note = "use `dispatch_with` instead")]
    pub async fn do_action_with(
        &self,
        request: &AcsRequest,
        options: &DispatchOptions,
    ) -> Result<Payload, AcsError> {
        warn!("do_action_with is deprecated, use dispatch_with instead");
        self.dispatch_with(request, options).await
    }

    fn retry_config(&self, options: &DispatchOptions) -> RetryConfig {
        let auto_retry = options.auto_retry.unwrap_or(self.config.auto_retry);
        let max_retries = if auto_retry {
            options.max_retries.unwrap_or(self.config.retry.max_retries)
        } else {
            1
        };

        RetryConfig {
            max_retries,
            ..self.config.retry.clone()
        }
    }

    /// Fill defaults from the profile and resolve the endpoint.
    fn prepare_call<'a>(
        &'a self,
        request: &'a AcsRequest,
        options: &'a DispatchOptions,
    ) -> Result<CallInputs<'a>, AcsError> {
        let profile = self.profile.as_deref();
        let missing = |what: &'static str| ConfigurationError::NoActiveProfile { missing: what };

        let signer = options
            .signer
            .as_deref()
            .or_else(|| profile.map(|p| p.signer().as_ref()))
            .ok_or_else(|| missing("signer"))?;
        let credential = options
            .credential
            .as_ref()
            .or_else(|| profile.map(Profile::credential))
            .ok_or_else(|| missing("credential"))?;
        let region_id = request
            .region_id()
            .or_else(|| profile.map(Profile::region_id))
            .ok_or_else(|| missing("region"))?;
        let format = request
            .format()
            .or_else(|| profile.map(Profile::format))
            .ok_or_else(|| missing("format"))?;
        let method = request
            .method()
            .or_else(|| profile.map(Profile::method))
            .unwrap_or_default();

        let domain = match request.endpoint() {
            Some(domain) => domain,
            None => self
                .endpoints
                .resolve(region_id, request.product())
                .ok_or_else(|| ConfigurationError::EndpointNotFound {
                    region: region_id.to_string(),
                    product: request.product().to_string(),
                })?,
        };

        Ok(CallInputs {
            resolved: ResolvedRequest {
                request,
                method,
                region_id: region_id.to_string(),
                format,
                domain: domain.to_string(),
            },
            signer,
            credential,
        })
    }
}

impl std::fmt::Debug for AcsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcsClient")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .field("endpoints", &self.endpoints.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`AcsClient`].
pub struct AcsClientBuilder {
    profile: Option<Profile>,
    config: Option<ClientConfig>,
    endpoints: Option<Arc<EndpointResolver>>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl AcsClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            profile: None,
            config: None,
            endpoints: None,
            transport: None,
        }
    }

    /// Use this profile. Without one, every call must supply a signer,
    /// credential, region and format.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Use this configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this endpoint resolver instead of the built-in table.
    pub fn endpoints(mut self, endpoints: Arc<EndpointResolver>) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Use a custom HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AcsClient, AcsError> {
        let config = self.config.unwrap_or_default();

        let endpoints = match self.endpoints {
            Some(endpoints) => endpoints,
            None => Arc::new(EndpointResolver::builtin()?),
        };

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&config)?),
        };

        Ok(AcsClient {
            profile: self.profile.map(Arc::new),
            config: Arc::new(config),
            endpoints,
            transport,
        })
    }
}

impl Default for AcsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
