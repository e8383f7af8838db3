//! Credential management for Detectify API authentication.

use reqwest::header::HeaderValue;

use crate::auth::signature::{DELIMITER, SigningKey};
use crate::error::DetectifyError;

/// API credentials containing the key and, optionally, the signing secret.
///
/// Credentials are validated when they are built: the API key must be a usable
/// header value, and the secret (if any) must be valid base64. A request can
/// therefore never fail halfway through authentication because of bad config.
pub struct Credentials {
    api_key: String,
    signing_key: Option<SigningKey>,
}

impl Credentials {
    /// Create new credentials from an API key and an optional base64 secret.
    ///
    /// A missing or blank secret disables request signing.
    pub fn new(api_key: impl Into<String>, secret: Option<&str>) -> Result<Self, DetectifyError> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;

        let signing_key = match secret {
            Some(secret) if !is_blank(secret) => Some(SigningKey::from_base64(secret)?),
            _ => None,
        };

        Ok(Self {
            api_key,
            signing_key,
        })
    }

    /// Create credentials that only send the API key header.
    pub fn api_key_only(api_key: impl Into<String>) -> Result<Self, DetectifyError> {
        Self::new(api_key, None)
    }

    /// The API key (public identifier).
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether requests made with these credentials are HMAC signed.
    pub fn is_signing(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Get the decoded signing key, if signing is enabled.
    pub(crate) fn signing_key(&self) -> Option<&SigningKey> {
        self.signing_key.as_ref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field(
                "secret",
                &if self.is_signing() {
                    "[REDACTED]"
                } else {
                    "[NONE]"
                },
            )
            .finish()
    }
}

/// Whether a configured secret counts as unset.
pub(crate) fn is_blank(secret: &str) -> bool {
    secret.trim().is_empty()
}

fn validate_api_key(api_key: &str) -> Result<(), DetectifyError> {
    if api_key.is_empty() {
        return Err(DetectifyError::Configuration(
            "API key must not be empty".to_string(),
        ));
    }
    if api_key.contains(DELIMITER) {
        return Err(DetectifyError::Configuration(format!(
            "API key must not contain '{DELIMITER}'"
        )));
    }
    HeaderValue::from_str(api_key).map_err(|_| {
        DetectifyError::Configuration("API key is not a valid header value".to_string())
    })?;
    Ok(())
}
