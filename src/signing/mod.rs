//! Request signing for the Open API.
//!
//! Two signature schemes exist. RPC-style APIs carry every parameter in the
//! query string and sign the canonicalized parameter set; ROA-style APIs
//! address a resource path and sign a digest of selected headers, sending the
//! result in `Authorization`. Both hash with a pluggable [`Signer`].

mod roa;
mod rpc;
mod signer;

pub use roa::{canonicalized_headers, canonicalized_resource, fill_uri_pattern, roa_string_to_sign};
pub use rpc::{canonicalized_query, rpc_string_to_sign};
pub use signer::{BearerTokenSigner, HmacSha1Signer, HmacSha256Signer, Signer};

use crate::credentials::Credential;
use crate::error::{AcsError, SigningError};
use crate::request::{ApiStyle, ResolvedRequest};
use crate::transport::HttpRequest;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Signature type sent with bearer token credentials.
pub const BEARER_TOKEN_TYPE: &str = "BEARERTOKEN";

/// Characters kept as-is by [`percent_encode`]: the RFC 3986 unreserved set.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a key or value for signing.
///
/// Everything outside `A-Za-z0-9-_.~` is encoded, so a space becomes `%20`
/// and `*` becomes `%2A`.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Base64-encoded MD5 digest, as sent in `Content-MD5`.
pub fn content_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    STANDARD.encode(hasher.finalize())
}

/// Format a timestamp for the RPC `Timestamp` parameter (ISO 8601, UTC).
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format a timestamp for the ROA `Date` header (RFC 1123, GMT).
pub fn format_rfc1123(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Per-attempt signing inputs.
///
/// A fresh context is taken for every send, so retried requests never reuse
/// a nonce.
#[derive(Debug, Clone)]
pub struct SigningContext {
    /// Signing time.
    pub timestamp: DateTime<Utc>,
    /// Unique signature nonce.
    pub nonce: String,
}

impl SigningContext {
    /// Context for the current time with a random nonce.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            nonce: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Context with fixed values.
    pub fn new(timestamp: DateTime<Utc>, nonce: impl Into<String>) -> Self {
        Self {
            timestamp,
            nonce: nonce.into(),
        }
    }
}

/// Sign a resolved request and turn it into an [`HttpRequest`].
///
/// Sets `Accept` from the format and `Content-Type` from the body (or from the
/// format when there is no body), then applies the signature scheme of the
/// request's API style.
pub fn sign_request(
    resolved: &ResolvedRequest<'_>,
    signer: &dyn Signer,
    credential: &Credential,
    ctx: &SigningContext,
) -> Result<HttpRequest, AcsError> {
    check_compatible(signer, credential)?;

    match resolved.request.style() {
        ApiStyle::Rpc => rpc::sign(resolved, signer, credential, ctx),
        ApiStyle::Roa { uri_pattern } => roa::sign(resolved, uri_pattern, signer, credential, ctx),
    }
}

/// Bearer tokens need the bearer signer and nothing else can use it.
fn check_compatible(signer: &dyn Signer, credential: &Credential) -> Result<(), SigningError> {
    let bearer_signer = signer.signer_type() == Some(BEARER_TOKEN_TYPE);
    let bearer_credential = matches!(credential, Credential::BearerToken { .. });

    if bearer_signer == bearer_credential {
        Ok(())
    } else {
        Err(SigningError::UnsupportedCredential {
            signer: signer.name(),
            credential: credential.kind(),
        })
    }
}

/// Secret used as the RPC HMAC key: the access key secret followed by `&`.
fn signing_secret(credential: &Credential) -> String {
    format!("{}&", credential.access_key_secret().unwrap_or_default())
}

/// Unsigned transport request: caller headers, `Accept`, `Content-Type` and body.
///
/// Header names are case-insensitive; `Accept` and `Content-Type` set here
/// replace caller headers of the same name.
fn prepare(resolved: &ResolvedRequest<'_>, url: String) -> HttpRequest {
    let mut http = HttpRequest::new(resolved.method.as_str(), url);
    for (name, value) in resolved.request.headers() {
        http.set_header(name.as_str(), value.as_str());
    }

    http.set_header("Accept", resolved.format.accept());

    match resolved.body() {
        Some(body) => {
            http.set_header("Content-Type", body.content_type);
            http.body = Some(body.bytes);
        }
        None => http.set_header("Content-Type", resolved.format.accept()),
    }

    http
}
