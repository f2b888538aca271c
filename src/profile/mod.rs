//! Client profile: the defaults applied to every call.

use crate::credentials::Credential;
use crate::error::{AcsError, CredentialsError};
use crate::signing::{BearerTokenSigner, HmacSha1Signer, Signer};
use crate::types::{Format, HttpMethod};
use std::sync::Arc;

/// Environment variable holding the default region id.
pub const REGION_ID_VAR: &str = "ALIBABA_CLOUD_REGION_ID";

/// Default region, credential, format, method and signer.
///
/// Immutable once built; the client shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Profile {
    region_id: String,
    credential: Credential,
    format: Format,
    method: HttpMethod,
    signer: Arc<dyn Signer>,
}

impl Profile {
    /// Create a profile builder.
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder::default()
    }

    /// Profile for a region and credential with every other field defaulted.
    pub fn new(region_id: impl Into<String>, credential: Credential) -> Self {
        let signer = default_signer(&credential);
        Self {
            region_id: region_id.into(),
            credential,
            format: Format::default(),
            method: HttpMethod::default(),
            signer,
        }
    }

    /// Load the region from [`REGION_ID_VAR`] and the credential from the
    /// environment (see [`Credential::from_env`]).
    pub fn from_env() -> Result<Self, AcsError> {
        let region_id = std::env::var(REGION_ID_VAR)
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CredentialsError::NotFound {
                variable: REGION_ID_VAR.to_string(),
            })?;
        Ok(Self::new(region_id, Credential::from_env()?))
    }

    /// Default region id.
    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    /// Default credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Default response format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Default HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Default signer.
    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }
}

fn default_signer(credential: &Credential) -> Arc<dyn Signer> {
    match credential {
        Credential::BearerToken { .. } => Arc::new(BearerTokenSigner),
        _ => Arc::new(HmacSha1Signer),
    }
}

/// Builder for [`Profile`].
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    region_id: Option<String>,
    credential: Option<Credential>,
    format: Option<Format>,
    method: Option<HttpMethod>,
    signer: Option<Arc<dyn Signer>>,
}

impl ProfileBuilder {
    /// Set the region id.
    pub fn region_id(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    /// Set the credential.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set the response format.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the signer. Defaults to HMAC-SHA1, or the bearer signer for
    /// bearer token credentials.
    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the profile. Region and credential are required.
    pub fn build(self) -> Result<Profile, AcsError> {
        let region_id = self.region_id.ok_or(CredentialsError::Invalid {
            message: "profile requires a region id".to_string(),
        })?;
        let credential = self.credential.ok_or(CredentialsError::Invalid {
            message: "profile requires a credential".to_string(),
        })?;

        let signer = self.signer.unwrap_or_else(|| default_signer(&credential));

        Ok(Profile {
            region_id,
            credential,
            format: self.format.unwrap_or_default(),
            method: self.method.unwrap_or_default(),
            signer,
        })
    }
}
