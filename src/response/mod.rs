//! Response decoding.
//!
//! A response body is decoded by its `Content-Type`: JSON and XML bodies
//! become structured values, everything else is kept as text.

mod xml;

pub use xml::xml_to_value;

use crate::error::{AcsError, ResponseError};
use crate::transport::HttpResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON body.
    Json(Value),
    /// XML body converted to a value; `Value::Null` when the XML was malformed.
    Xml(Value),
    /// Any other body.
    Text(String),
}

impl Payload {
    /// Structured value of a JSON or XML payload.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) | Payload::Xml(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// Consume the payload, returning its structured value.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Payload::Json(value) | Payload::Xml(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// Top-level field of a structured payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_value()?.get(key)
    }

    /// Body of a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for a structured payload holding `null`.
    pub fn is_null(&self) -> bool {
        matches!(self.as_value(), Some(Value::Null))
    }

    /// `RequestId` field, if present.
    pub fn request_id(&self) -> Option<&str> {
        self.get("RequestId")?.as_str()
    }

    /// Deserialize a structured payload into `T`.
    ///
    /// XML leaves are strings, so numeric fields of XML payloads need string
    /// types (or a custom deserializer) on `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, AcsError> {
        let value = match self.as_value() {
            Some(Value::Null) | None => return Err(ResponseError::Unstructured.into()),
            Some(value) => value,
        };
        serde_json::from_value(value.clone()).map_err(|e| {
            ResponseError::Deserialize {
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Decode a response body by its `Content-Type`.
///
/// Never fails: a JSON body that does not parse is returned as text and
/// malformed XML yields `Payload::Xml(Value::Null)`.
pub fn parse_response(response: &HttpResponse) -> Payload {
    let content_type = response
        .content_type()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let text = response.text();

    if content_type.contains("json") {
        match serde_json::from_str(&text) {
            Ok(value) => Payload::Json(value),
            Err(e) => {
                debug!(error = %e, "Response declared JSON but did not parse");
                Payload::Text(text)
            }
        }
    } else if content_type.contains("xml") {
        match xml_to_value(&text) {
            Ok(value) => Payload::Xml(value),
            Err(e) => {
                debug!(error = %e, "Response declared XML but did not parse");
                Payload::Xml(Value::Null)
            }
        }
    } else {
        Payload::Text(text)
    }
}

/// True when the status is in `[200, 300)`.
pub fn is_success(response: &HttpResponse) -> bool {
    response.is_success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use test_case::test_case;

    fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        if !content_type.is_empty() {
            headers.insert("Content-Type".to_string(), content_type.to_string());
        }
        HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_json_body() {
        let payload = parse_response(&response(
            200,
            "application/json;charset=utf-8",
            r#"{"RequestId":"R1","TotalCount":2}"#,
        ));

        assert_eq!(payload, Payload::Json(json!({"RequestId": "R1", "TotalCount": 2})));
        assert_eq!(payload.request_id(), Some("R1"));
        assert_eq!(payload.get("TotalCount"), Some(&json!(2)));
    }

    #[test]
    fn test_invalid_json_falls_back_to_text() {
        let payload = parse_response(&response(502, "application/json", "<html>Bad Gateway</html>"));
        assert_eq!(payload.as_text(), Some("<html>Bad Gateway</html>"));
    }

    #[test]
    fn test_xml_body() {
        let payload = parse_response(&response(
            200,
            "text/xml;charset=utf-8",
            "<DescribeRegionsResponse><RequestId>R2</RequestId></DescribeRegionsResponse>",
        ));

        assert_eq!(payload, Payload::Xml(json!({"RequestId": "R2"})));
        assert_eq!(payload.request_id(), Some("R2"));
    }

    #[test]
    fn test_malformed_xml_is_null() {
        let payload = parse_response(&response(200, "application/xml", "<A><B></A>"));
        assert_eq!(payload, Payload::Xml(Value::Null));
        assert!(payload.is_null());
    }

    #[test_case("text/plain" ; "plain text")]
    #[test_case("application/octet-stream" ; "binary")]
    #[test_case("" ; "missing content type")]
    fn test_other_bodies_are_text(content_type: &str) {
        let payload = parse_response(&response(200, content_type, "hello"));
        assert_eq!(payload, Payload::Text("hello".to_string()));
        assert!(payload.as_value().is_none());
    }

    #[test_case(200, true)]
    #[test_case(204, true)]
    #[test_case(299, true)]
    #[test_case(300, false)]
    #[test_case(404, false)]
    #[test_case(500, false)]
    fn test_is_success(status: u16, expected: bool) {
        assert_eq!(is_success(&response(status, "", "")), expected);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Regions {
        request_id: String,
        total_count: u32,
    }

    #[test]
    fn test_deserialize() {
        let payload = Payload::Json(json!({"RequestId": "R1", "TotalCount": 3}));
        let regions: Regions = payload.deserialize().unwrap();
        assert_eq!(
            regions,
            Regions {
                request_id: "R1".to_string(),
                total_count: 3
            }
        );
    }

    #[test]
    fn test_deserialize_unstructured() {
        let text = Payload::Text("hello".to_string());
        assert!(matches!(
            text.deserialize::<Regions>(),
            Err(AcsError::Response(ResponseError::Unstructured))
        ));

        let null = Payload::Xml(Value::Null);
        assert!(null.deserialize::<Regions>().is_err());
    }
}
