//! Mapping from failed responses to [`ServiceError`].

use super::ServiceError;
use crate::response::Payload;
use crate::transport::HttpResponse;
use serde_json::Value;

/// Error fields reported in a JSON or XML error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFields {
    /// Error code (e.g. `InvalidParameter`).
    pub code: Option<String>,
    /// Human-readable error message.
    pub message: Option<String>,
    /// Request correlation id.
    pub request_id: Option<String>,
    /// Host id.
    pub host_id: Option<String>,
}

impl ErrorFields {
    /// Extract error fields from a decoded payload.
    ///
    /// Fields are read from the top level, or from an `Error` object when the
    /// service wraps them (`{"Error": {"Code": ...}}`).
    pub fn from_payload(payload: &Payload) -> Self {
        match payload.as_value() {
            Some(value) => Self::from_value(value),
            None => Self::default(),
        }
    }

    fn from_value(value: &Value) -> Self {
        let object = match value.get("Error") {
            Some(inner) if inner.is_object() => inner,
            _ => value,
        };

        Self {
            code: string_field(object, "Code"),
            message: string_field(object, "Message"),
            request_id: string_field(object, "RequestId")
                .or_else(|| string_field(value, "RequestId")),
            host_id: string_field(object, "HostId"),
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build the service error for a response whose status is outside `[200, 300)`.
///
/// The request id falls back to the `x-acs-request-id` response header when the
/// body does not carry one. A body without an error message (e.g. plain text
/// from a proxy) keeps its text as the message.
pub fn service_error_from_response(payload: &Payload, response: &HttpResponse) -> ServiceError {
    let fields = ErrorFields::from_payload(payload);

    let message = fields.message.unwrap_or_else(|| match payload {
        Payload::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => format!("HTTP status {}", response.status),
    });

    ServiceError {
        message,
        code: fields.code.unwrap_or_else(|| "UnknownError".to_string()),
        status: response.status,
        request_id: fields
            .request_id
            .or_else(|| response.request_id().map(str::to_string)),
        host_id: fields.host_id,
    }
}
