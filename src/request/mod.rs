//! API requests.
//!
//! An [`AcsRequest`] describes one call: the product, API version and action,
//! how parameters travel, and optional per-call overrides of the profile
//! defaults. The client turns it into a [`ResolvedRequest`] once region,
//! format, method and domain are known.

use crate::types::{Format, HttpMethod, Protocol};
use bytes::Bytes;
use std::collections::BTreeMap;

/// Content type of form-encoded domain parameters.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// How the API is addressed and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStyle {
    /// Query-string API selected by the `Action` parameter.
    Rpc,
    /// Resource-path API. `[Name]` placeholders in the pattern are filled from
    /// the path parameters.
    Roa {
        /// URI pattern, e.g. `/clusters/[ClusterId]`.
        uri_pattern: String,
    },
}

/// A single Open API call.
#[derive(Debug, Clone)]
pub struct AcsRequest {
    product: String,
    version: String,
    action: String,
    style: ApiStyle,
    method: Option<HttpMethod>,
    region_id: Option<String>,
    format: Option<Format>,
    protocol: Protocol,
    endpoint: Option<String>,
    query_params: BTreeMap<String, String>,
    domain_params: BTreeMap<String, String>,
    path_params: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    content: Option<Bytes>,
    content_type: Option<String>,
}

impl AcsRequest {
    fn new(
        product: impl Into<String>,
        version: impl Into<String>,
        action: impl Into<String>,
        style: ApiStyle,
    ) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            action: action.into(),
            style,
            method: None,
            region_id: None,
            format: None,
            protocol: Protocol::default(),
            endpoint: None,
            query_params: BTreeMap::new(),
            domain_params: BTreeMap::new(),
            path_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            content: None,
            content_type: None,
        }
    }

    /// Create an RPC-style request.
    pub fn rpc(
        product: impl Into<String>,
        version: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(product, version, action, ApiStyle::Rpc)
    }

    /// Create an ROA-style request for a URI pattern.
    pub fn roa(
        product: impl Into<String>,
        version: impl Into<String>,
        action: impl Into<String>,
        uri_pattern: impl Into<String>,
    ) -> Self {
        Self::new(
            product,
            version,
            action,
            ApiStyle::Roa {
                uri_pattern: uri_pattern.into(),
            },
        )
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the region id.
    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    /// Set the response format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the protocol.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Send to this domain (`host[:port]`) instead of looking it up.
    pub fn with_endpoint(mut self, domain: impl Into<String>) -> Self {
        self.endpoint = Some(domain.into());
        self
    }

    /// Add a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Add a domain parameter, sent in the form-encoded body.
    pub fn with_domain_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.domain_params.insert(key.into(), value.into());
        self
    }

    /// Add a path parameter (ROA).
    pub fn with_path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a raw body. Ignored when domain parameters are present.
    pub fn with_content(mut self, content: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// Add or replace a query parameter in place.
    pub fn set_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query_params.insert(key.into(), value.into());
    }

    /// Add or replace a domain parameter in place.
    pub fn set_domain_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.domain_params.insert(key.into(), value.into());
    }

    /// Product name, e.g. `Ecs`.
    pub fn product(&self) -> &str {
        &self.product
    }

    /// API version, e.g. `2014-05-26`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Action name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// API style.
    pub fn style(&self) -> &ApiStyle {
        &self.style
    }

    /// Explicit HTTP method, if set.
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Explicit region id, if set.
    pub fn region_id(&self) -> Option<&str> {
        self.region_id.as_deref()
    }

    /// Explicit format, if set.
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Endpoint override, if set.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Query parameters.
    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    /// Domain parameters.
    pub fn domain_params(&self) -> &BTreeMap<String, String> {
        &self.domain_params
    }

    /// Path parameters.
    pub fn path_params(&self) -> &BTreeMap<String, String> {
        &self.path_params
    }

    /// Extra headers.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Raw content, if set.
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }
}

/// Serialized request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    /// Body bytes.
    pub bytes: Bytes,
    /// Content type of the body.
    pub content_type: String,
}

/// A request whose method, region, format and domain are known.
#[derive(Debug, Clone)]
pub struct ResolvedRequest<'a> {
    /// The request.
    pub request: &'a AcsRequest,
    /// HTTP method.
    pub method: HttpMethod,
    /// Region id.
    pub region_id: String,
    /// Response format.
    pub format: Format,
    /// Target domain.
    pub domain: String,
}

impl ResolvedRequest<'_> {
    /// Body to send.
    ///
    /// Domain parameters win and are form-encoded; otherwise the raw content
    /// is sent; otherwise there is no body.
    pub fn body(&self) -> Option<RequestBody> {
        let request = self.request;

        if !request.domain_params.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(request.domain_params.iter())
                .finish();
            return Some(RequestBody {
                bytes: Bytes::from(encoded),
                content_type: FORM_CONTENT_TYPE.to_string(),
            });
        }

        request.content.as_ref().map(|content| RequestBody {
            bytes: content.clone(),
            content_type: request
                .content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        })
    }
}
