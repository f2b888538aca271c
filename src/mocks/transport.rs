//! Mock HTTP transport for testing.

use crate::error::{AcsError, NetworkError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// Response with no content type.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// JSON response.
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).with_header("Content-Type", "application/json;charset=utf-8")
    }

    /// XML response.
    pub fn xml(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).with_header("Content-Type", "text/xml;charset=utf-8")
    }

    /// Plain text response.
    pub fn text(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).with_header("Content-Type", "text/plain")
    }

    /// Add a header to the response.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

enum Outcome {
    Response(MockResponse),
    ConnectionFailed(String),
    Timeout(String),
}

/// Mock HTTP transport for testing.
///
/// Queued outcomes are returned in order; once the queue is empty the default
/// response is returned, or an error when there is none.
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<HttpRequest>>,
    default_response: Option<MockResponse>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Create a new mock transport with no responses.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: None,
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a mock transport with queued responses.
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        let transport = Self::new();
        for response in responses {
            transport.queue_response(response);
        }
        transport
    }

    /// Create a mock transport answering every request with `response`.
    pub fn with_default(response: MockResponse) -> Self {
        Self {
            default_response: Some(response),
            ..Self::new()
        }
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: MockResponse) {
        self.outcomes.lock().push_back(Outcome::Response(response));
    }

    /// Queue a connection failure.
    pub fn queue_connection_failure(&self, message: impl Into<String>) {
        self.outcomes
            .lock()
            .push_back(Outcome::ConnectionFailed(message.into()));
    }

    /// Queue a timeout.
    pub fn queue_timeout(&self, message: impl Into<String>) {
        self.outcomes.lock().push_back(Outcome::Timeout(message.into()));
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Get the last request made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Highest number of requests that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AcsError> {
        self.requests.lock().push(request);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let outcome = self.outcomes.lock().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Some(Outcome::Response(mock)) => Ok(mock.into()),
            Some(Outcome::ConnectionFailed(message)) => {
                Err(NetworkError::ConnectionFailed { message }.into())
            }
            Some(Outcome::Timeout(message)) => Err(NetworkError::Timeout { message }.into()),
            None => match &self.default_response {
                Some(mock) => Ok(mock.clone().into()),
                None => Err(NetworkError::InvalidRequest {
                    message: "No mock response available".to_string(),
                }
                .into()),
            },
        }
    }
}

impl From<MockResponse> for HttpResponse {
    fn from(mock: MockResponse) -> Self {
        HttpResponse {
            status: mock.status,
            headers: mock.headers,
            body: mock.body,
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued_outcomes", &self.outcomes.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_responses_in_order() {
        let transport = MockTransport::with_responses(vec![
            MockResponse::json(200, "{}"),
            MockResponse::text(404, "Not Found"),
        ]);

        let first = transport
            .send(HttpRequest::new("GET", "https://example.com/1"))
            .await
            .unwrap();
        let second = transport
            .send(HttpRequest::new("GET", "https://example.com/2"))
            .await
            .unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(first.content_type(), Some("application/json;charset=utf-8"));
        assert_eq!(second.status, 404);
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.last_request().unwrap().url, "https://example.com/2");
    }

    #[tokio::test]
    async fn test_default_response() {
        let transport = MockTransport::with_default(MockResponse::text(200, "default"));

        for _ in 0..3 {
            let response = transport
                .send(HttpRequest::new("GET", "https://example.com"))
                .await
                .unwrap();
            assert_eq!(response.text(), "default");
        }
    }

    #[tokio::test]
    async fn test_queued_failures() {
        let transport = MockTransport::new();
        transport.queue_connection_failure("refused");
        transport.queue_timeout("slow");

        let first = transport
            .send(HttpRequest::new("GET", "https://example.com"))
            .await
            .unwrap_err();
        let second = transport
            .send(HttpRequest::new("GET", "https://example.com"))
            .await
            .unwrap_err();

        assert!(first.is_retryable());
        assert!(matches!(second, AcsError::Network(NetworkError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_empty_queue_is_not_retryable() {
        let transport = MockTransport::new();
        let error = transport
            .send(HttpRequest::new("GET", "https://example.com"))
            .await
            .unwrap_err();
        assert!(!error.is_retryable());
    }
}
