//! Access credentials.
//!
//! A credential is owned by a [`Profile`](crate::Profile) or passed per call
//! and is only ever read by the client. Secrets are kept in
//! [`SecretString`] and redacted from `Debug` output.

use crate::error::{AcsError, CredentialsError};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;

/// Environment variable holding the access key id.
pub const ACCESS_KEY_ID_VAR: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
/// Environment variable holding the access key secret.
pub const ACCESS_KEY_SECRET_VAR: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
/// Environment variable holding an optional STS security token.
pub const SECURITY_TOKEN_VAR: &str = "ALIBABA_CLOUD_SECURITY_TOKEN";

/// Credential used to authenticate API calls.
#[derive(Clone)]
pub enum Credential {
    /// Long-term access key pair.
    AccessKey {
        /// Access key id.
        access_key_id: String,
        /// Access key secret.
        access_key_secret: SecretString,
    },
    /// Temporary access key pair issued by STS.
    StsToken {
        /// Access key id.
        access_key_id: String,
        /// Access key secret.
        access_key_secret: SecretString,
        /// Security token sent with each request.
        security_token: SecretString,
    },
    /// Bearer token; requests are not HMAC-signed.
    BearerToken {
        /// The bearer token.
        token: SecretString,
    },
}

impl Credential {
    /// Create an access key credential.
    pub fn access_key(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        Credential::AccessKey {
            access_key_id: access_key_id.into(),
            access_key_secret: SecretString::new(access_key_secret.into()),
        }
    }

    /// Create an STS credential.
    pub fn sts_token(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        Credential::StsToken {
            access_key_id: access_key_id.into(),
            access_key_secret: SecretString::new(access_key_secret.into()),
            security_token: SecretString::new(security_token.into()),
        }
    }

    /// Create a bearer token credential.
    pub fn bearer_token(token: impl Into<String>) -> Self {
        Credential::BearerToken {
            token: SecretString::new(token.into()),
        }
    }

    /// Load an access key (or STS) credential from the environment.
    ///
    /// Reads [`ACCESS_KEY_ID_VAR`] and [`ACCESS_KEY_SECRET_VAR`]; when
    /// [`SECURITY_TOKEN_VAR`] is set and non-empty an STS credential is returned.
    pub fn from_env() -> Result<Self, AcsError> {
        let access_key_id = required_var(ACCESS_KEY_ID_VAR)?;
        let access_key_secret = required_var(ACCESS_KEY_SECRET_VAR)?;
        let token = env::var(SECURITY_TOKEN_VAR).ok().filter(|s| !s.is_empty());

        Ok(match token {
            Some(token) => Credential::sts_token(access_key_id, access_key_secret, token),
            None => Credential::access_key(access_key_id, access_key_secret),
        })
    }

    /// Short name of the credential kind, for errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::AccessKey { .. } => "access_key",
            Credential::StsToken { .. } => "sts",
            Credential::BearerToken { .. } => "bearer_token",
        }
    }

    /// Access key id, if this is a key-based credential.
    pub fn access_key_id(&self) -> Option<&str> {
        match self {
            Credential::AccessKey { access_key_id, .. }
            | Credential::StsToken { access_key_id, .. } => Some(access_key_id),
            Credential::BearerToken { .. } => None,
        }
    }

    /// Access key secret, if this is a key-based credential.
    ///
    /// Note: This exposes the secret. Avoid logging it.
    pub fn access_key_secret(&self) -> Option<&str> {
        match self {
            Credential::AccessKey {
                access_key_secret, ..
            }
            | Credential::StsToken {
                access_key_secret, ..
            } => Some(access_key_secret.expose_secret()),
            Credential::BearerToken { .. } => None,
        }
    }

    /// STS security token, if any.
    pub fn security_token(&self) -> Option<&str> {
        match self {
            Credential::StsToken { security_token, .. } => Some(security_token.expose_secret()),
            _ => None,
        }
    }

    /// Bearer token, if any.
    pub fn bearer_token_value(&self) -> Option<&str> {
        match self {
            Credential::BearerToken { token } => Some(token.expose_secret()),
            _ => None,
        }
    }
}

fn required_var(name: &str) -> Result<String, AcsError> {
    let value = env::var(name).map_err(|_| CredentialsError::NotFound {
        variable: name.to_string(),
    })?;
    if value.is_empty() {
        return Err(CredentialsError::Invalid {
            message: format!("{} is empty", name),
        }
        .into());
    }
    Ok(value)
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::AccessKey { access_key_id, .. } => f
                .debug_struct("AccessKey")
                .field("access_key_id", access_key_id)
                .field("access_key_secret", &"[REDACTED]")
                .finish(),
            Credential::StsToken { access_key_id, .. } => f
                .debug_struct("StsToken")
                .field("access_key_id", access_key_id)
                .field("access_key_secret", &"[REDACTED]")
                .field("security_token", &"[REDACTED]")
                .finish(),
            Credential::BearerToken { .. } => f
                .debug_struct("BearerToken")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_key() {
        let credential = Credential::access_key("AKID", "SECRET");
        assert_eq!(credential.kind(), "access_key");
        assert_eq!(credential.access_key_id(), Some("AKID"));
        assert_eq!(credential.access_key_secret(), Some("SECRET"));
        assert!(credential.security_token().is_none());
        assert!(credential.bearer_token_value().is_none());
    }

    #[test]
    fn test_sts_token() {
        let credential = Credential::sts_token("STS.AKID", "SECRET", "TOKEN");
        assert_eq!(credential.kind(), "sts");
        assert_eq!(credential.security_token(), Some("TOKEN"));
    }

    #[test]
    fn test_bearer_token() {
        let credential = Credential::bearer_token("BEARER");
        assert!(credential.access_key_id().is_none());
        assert_eq!(credential.bearer_token_value(), Some("BEARER"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = Credential::sts_token("AKID", "SECRET", "TOKEN");
        let debug = format!("{:?}", credential);

        assert!(debug.contains("AKID"));
        assert!(!debug.contains("SECRET"));
        assert!(!debug.contains("TOKEN"));
        assert!(debug.contains("[REDACTED]"));
    }
}
