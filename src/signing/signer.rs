//! Signature algorithms.

use super::BEARER_TOKEN_TYPE;
use crate::error::SigningError;
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

/// Hashes a string-to-sign with a secret.
///
/// Implementations are stateless and shared between requests.
pub trait Signer: Send + Sync + std::fmt::Debug {
    /// Algorithm name sent as `SignatureMethod` / `x-acs-signature-method`.
    fn name(&self) -> &'static str;

    /// Algorithm version sent as `SignatureVersion` / `x-acs-signature-version`.
    fn version(&self) -> &'static str;

    /// Signature type, sent only when set.
    fn signer_type(&self) -> Option<&'static str> {
        None
    }

    /// Compute the base64 signature of `string_to_sign`.
    fn sign(&self, string_to_sign: &str, secret: &str) -> Result<String, SigningError>;
}

/// HMAC-SHA1, the default algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signer;

impl Signer for HmacSha1Signer {
    fn name(&self) -> &'static str {
        "HMAC-SHA1"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn sign(&self, string_to_sign: &str, secret: &str) -> Result<String, SigningError> {
        let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes()).map_err(|e| {
            SigningError::CalculationFailed {
                message: e.to_string(),
            }
        })?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// HMAC-SHA256.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Signer;

impl Signer for HmacSha256Signer {
    fn name(&self) -> &'static str {
        "HMAC-SHA256"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn sign(&self, string_to_sign: &str, secret: &str) -> Result<String, SigningError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|e| {
            SigningError::CalculationFailed {
                message: e.to_string(),
            }
        })?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// Signer for bearer token credentials. The token authenticates the call, so
/// no signature is computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerTokenSigner;

impl Signer for BearerTokenSigner {
    fn name(&self) -> &'static str {
        BEARER_TOKEN_TYPE
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn signer_type(&self) -> Option<&'static str> {
        Some(BEARER_TOKEN_TYPE)
    }

    fn sign(&self, _string_to_sign: &str, _secret: &str) -> Result<String, SigningError> {
        Ok(String::new())
    }
}
