//! HTTP transport layer.
//!
//! The client owns an [`HttpTransport`] and never exposes it; any HTTP client
//! able to send a method/URL/headers/body request can back it. The default
//! implementation uses reqwest with connection pooling and per-request timeouts.

use crate::config::ClientConfig;
use crate::error::{AcsError, NetworkError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use url::Url;

/// HTTP request to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a new HTTP request.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header, replacing any header of the same name in another case.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set a header. Names are case-insensitive, so an existing header that
    /// differs only in case is removed first.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Get a query parameter from the URL, decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let value = url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned());
        value
    }
}

/// HTTP response received.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response indicates a client error (4xx status).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response indicates a server fault (status >= 500).
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Get the request id from response headers.
    pub fn request_id(&self) -> Option<&str> {
        self.get_header("x-acs-request-id")
    }

    /// Get the content type.
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// HTTP transport trait for making requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and return the response.
    ///
    /// Any status code is a successful send; only failures to obtain a
    /// response are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AcsError>;
}

/// Default transport backed by a pooled `reqwest::Client`.
///
/// Timeouts, pool sizing, certificate checks and the User-Agent come from
/// [`ClientConfig`]; a call that exceeds `read_timeout` fails with
/// [`NetworkError::Timeout`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with the default [`ClientConfig`] settings.
    pub fn new() -> Result<Self, AcsError> {
        Self::from_config(&ClientConfig::default())
    }

    /// Transport honoring the connection settings of `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AcsError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| NetworkError::TlsError {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

/// Classify a reqwest failure. Builder errors are the only non-retryable kind.
fn network_error(error: reqwest::Error) -> NetworkError {
    let message = error.to_string();
    if error.is_timeout() {
        NetworkError::Timeout { message }
    } else if error.is_builder() {
        NetworkError::InvalidRequest { message }
    } else {
        NetworkError::ConnectionFailed { message }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AcsError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let method = reqwest::Method::from_bytes(method.as_bytes()).map_err(|_| {
            NetworkError::InvalidRequest {
                message: format!("unsupported HTTP method '{}'", method),
            }
        })?;
        let url = Url::parse(&url).map_err(|e| NetworkError::InvalidRequest {
            message: format!("malformed URL '{}': {}", url, e),
        })?;

        let mut outgoing = self.client.request(method, url);
        for (name, value) in &headers {
            outgoing = outgoing.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            outgoing = outgoing.body(body);
        }

        let response = outgoing.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(network_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new("POST", "https://ecs.aliyuncs.com/?Action=DescribeRegions")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("InstanceId=i-123");

        assert_eq!(request.method, "POST");
        assert_eq!(
            request.get_header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.query_param("Action").as_deref(), Some("DescribeRegions"));
        assert!(request.query_param("Missing").is_none());
        assert!(request.body.is_some());
    }

    #[test]
    fn test_set_header_replaces_other_case() {
        let mut request = HttpRequest::new("GET", "https://cs.aliyuncs.com/clusters")
            .with_header("accept", "application/xml");
        request.set_header("Accept", "application/json");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers.get("Accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = |status| HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        };

        assert!(response(200).is_success());
        assert!(response(299).is_success());
        assert!(!response(300).is_success());
        assert!(response(404).is_client_error());
        assert!(response(500).is_server_error());
        assert!(response(599).is_server_error());
        assert!(!response(499).is_server_error());
    }

    #[test]
    fn test_http_response_headers() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json;charset=utf-8".to_string());
        headers.insert("x-acs-request-id".to_string(), "ABC123".to_string());

        let response = HttpResponse {
            status: 200,
            headers,
            body: Bytes::from_static(b"{}"),
        };

        assert_eq!(response.content_type(), Some("application/json;charset=utf-8"));
        assert_eq!(response.get_header("content-type"), Some("application/json;charset=utf-8"));
        assert_eq!(response.request_id(), Some("ABC123"));
        assert_eq!(response.text(), "{}");
    }

    #[test]
    fn test_transport_from_config() {
        let config = ClientConfig::builder()
            .connect_timeout(Duration::from_secs(1))
            .read_timeout(Duration::from_secs(2))
            .verify_ssl(false)
            .build()
            .unwrap();

        assert!(ReqwestTransport::from_config(&config).is_ok());
    }
}
