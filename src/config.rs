//! Provider configuration.
//!
//! The configuration carries the values an embedding application collects from
//! its users: the API key, the optional signature secret and an optional base URL.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::auth::{Credentials, is_blank};
use crate::error::DetectifyError;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "DETECTIFY_API_KEY";

/// Environment variable holding the base64 signature secret.
pub const SIGNATURE_ENV: &str = "DETECTIFY_SIGNATURE";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "DETECTIFY_BASE_URL";

/// Detectify provider configuration.
///
/// # Example
///
/// ```rust
/// use detectify_api_client::config::ProviderConfig;
///
/// let config = ProviderConfig::new("abc123").with_signature("c2VjcmV0");
/// assert!(config.is_signing());
/// let credentials = config.credentials().unwrap();
/// assert_eq!(credentials.api_key(), "abc123");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Detectify API key.
    pub api_key: String,
    /// Base64 secret for HMAC request signing. Signing is disabled when unset or blank.
    #[serde(default)]
    pub signature: Option<SecretString>,
    /// Override for the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Create a configuration with only an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            signature: None,
            base_url: None,
        }
    }

    /// Set the signature secret.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(SecretString::from(signature.into()));
        self
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load the configuration from `DETECTIFY_API_KEY`, `DETECTIFY_SIGNATURE`
    /// and `DETECTIFY_BASE_URL`.
    pub fn from_env() -> Result<Self, DetectifyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through a variable lookup function.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DetectifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !is_blank(value));

        let api_key = get(API_KEY_ENV).ok_or_else(|| {
            DetectifyError::Configuration(format!("{API_KEY_ENV} is not set"))
        })?;

        Ok(Self {
            api_key,
            signature: get(SIGNATURE_ENV).map(SecretString::from),
            base_url: get(BASE_URL_ENV),
        })
    }

    /// Whether the configuration enables request signing.
    pub fn is_signing(&self) -> bool {
        self.signature
            .as_ref()
            .is_some_and(|secret| !is_blank(secret.expose_secret()))
    }

    /// Validate the configuration and build credentials from it.
    pub fn credentials(&self) -> Result<Credentials, DetectifyError> {
        let secret = self.signature.as_ref().map(|secret| secret.expose_secret());
        Credentials::new(self.api_key.clone(), secret)
    }
}
