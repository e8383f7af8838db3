//! HMAC-SHA256 signature generation for Detectify API authentication.
//!
//! Signed requests carry a signature computed as:
//! ```text
//! HMAC-SHA256("{method};{path};{api_key};{timestamp};{body}", base64_decode(secret))
//! ```
//!
//! The signature is then base64-encoded and sent in the `X-Detectify-Signature` header,
//! alongside the timestamp in `X-Detectify-Timestamp`.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretSlice};
use sha2::Sha256;

use crate::error::DetectifyError;

type HmacSha256 = Hmac<Sha256>;

/// Field separator of the canonical message.
pub const DELIMITER: char = ';';

/// Length in bytes of a decoded signature (the SHA-256 digest size).
pub const SIGNATURE_LEN: usize = 32;

/// A decoded signing secret.
///
/// The secret is decoded from base64 once, when the key is built, so that request
/// signing never has to handle malformed configuration.
pub struct SigningKey {
    key: SecretSlice<u8>,
}

impl SigningKey {
    /// Decode a base64 (standard alphabet) secret into a signing key.
    pub fn from_base64(secret: &str) -> Result<Self, DetectifyError> {
        let decoded = BASE64.decode(secret)?;
        Ok(Self {
            key: SecretSlice::new(decoded.into_boxed_slice()),
        })
    }

    /// Sign the canonical message built from the given request fields.
    ///
    /// # Errors
    ///
    /// Returns [`DetectifyError::UnsignableRequest`] if `method`, `path` or
    /// `api_key` contains `;`.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        api_key: &str,
        timestamp: i64,
        body: &[u8],
    ) -> Result<String, DetectifyError> {
        let message = canonical_message(method, path, api_key, timestamp, body)?;

        let mut hmac = HmacSha256::new_from_slice(self.key.expose_secret())
            .map_err(|e| DetectifyError::Configuration(format!("Invalid HMAC key: {e}")))?;
        hmac.update(&message);
        let hmac_result = hmac.finalize().into_bytes();

        Ok(BASE64.encode(hmac_result))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Build the canonical message `"{method};{path};{api_key};{timestamp};{body}"`.
///
/// The body is the last field and is appended as raw bytes. The leading fields must
/// not contain the delimiter, otherwise two distinct requests could share a message.
pub fn canonical_message(
    method: &str,
    path: &str,
    api_key: &str,
    timestamp: i64,
    body: &[u8],
) -> Result<Vec<u8>, DetectifyError> {
    for (field, value) in [("method", method), ("path", path), ("api key", api_key)] {
        if value.contains(DELIMITER) {
            return Err(DetectifyError::UnsignableRequest(format!(
                "{field} must not contain '{DELIMITER}'"
            )));
        }
    }

    let prefix = format!("{method};{path};{api_key};{timestamp};");
    let mut message = Vec::with_capacity(prefix.len() + body.len());
    message.extend_from_slice(prefix.as_bytes());
    message.extend_from_slice(body);
    Ok(message)
}

/// Calculate the signature for a Detectify API request.
///
/// # Arguments
///
/// * `method` - The HTTP method, verbatim (e.g., "GET")
/// * `path` - The URL path without scheme, host or query (e.g., "/v2/assets")
/// * `api_key` - The plaintext API key
/// * `secret_key` - The base64-encoded shared secret
/// * `timestamp` - Unix timestamp in seconds
/// * `body` - The request body bytes (empty for bodiless requests)
///
/// # Returns
///
/// Base64-encoded HMAC-SHA256 signature for the `X-Detectify-Signature` header.
///
/// # Errors
///
/// - [`DetectifyError::InvalidSecret`] if `secret_key` is not valid base64. No HMAC
///   is computed in that case.
/// - [`DetectifyError::UnsignableRequest`] if `method`, `path` or `api_key` contains
///   `;`, since the fields could then shift into each other.
///
/// # Example
///
/// ```rust
/// use detectify_api_client::auth::calculate_signature;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let signature = calculate_signature(
///     "GET",
///     "/v2/assets",
///     "abc123",
///     "c2VjcmV0", // base64 of "secret"
///     1700000000,
///     b"",
/// )?;
/// assert_eq!(signature, "texel15YCQWqRQQfCcP/7NTMNcZhAjk3ptiHolRB5BY=");
/// # Ok(())
/// # }
/// ```
pub fn calculate_signature(
    method: &str,
    path: &str,
    api_key: &str,
    secret_key: &str,
    timestamp: i64,
    body: &[u8],
) -> Result<String, DetectifyError> {
    SigningKey::from_base64(secret_key)?.sign(method, path, api_key, timestamp, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "c2VjcmV0";

    #[test]
    fn test_known_vector() {
        let signature =
            calculate_signature("GET", "/v2/assets", "abc123", SECRET, 1700000000, b"").unwrap();
        assert_eq!(signature, "texel15YCQWqRQQfCcP/7NTMNcZhAjk3ptiHolRB5BY=");
    }

    #[test]
    fn test_known_vector_with_body() {
        let signature = calculate_signature(
            "POST",
            "/v2/assets/",
            "abc123",
            SECRET,
            1700000000,
            br#"{"name":"example.com"}"#,
        )
        .unwrap();
        assert_eq!(signature, "4B8WUHpW0eAQiFJ45b6EaiT3khvImthQ5fKahEk1LaI=");
    }

    #[test]
    fn test_signature_decodes_to_digest_length() {
        let signature =
            calculate_signature("DELETE", "/v2/assets/abc/", "key", SECRET, 1, b"payload").unwrap();
        let decoded = BASE64.decode(&signature).unwrap();
        assert_eq!(decoded.len(), SIGNATURE_LEN);
        // 32 bytes base64 encoded = 44 chars (with padding)
        assert_eq!(signature.len(), 44);
    }

    #[test]
    fn test_signature_consistency() {
        let key = SigningKey::from_base64(SECRET).unwrap();
        let sig1 = key.sign("GET", "/v2/assets", "key", 12345, b"body").unwrap();
        let sig2 = key.sign("GET", "/v2/assets", "key", 12345, b"body").unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_changes_with_each_field() {
        let key = SigningKey::from_base64(SECRET).unwrap();
        let base = key.sign("GET", "/v2/assets", "key", 12345, b"body").unwrap();

        let variants = [
            key.sign("POST", "/v2/assets", "key", 12345, b"body").unwrap(),
            key.sign("GET", "/v2/assets/", "key", 12345, b"body").unwrap(),
            key.sign("GET", "/v2/assets", "other", 12345, b"body").unwrap(),
            key.sign("GET", "/v2/assets", "key", 12346, b"body").unwrap(),
            key.sign("GET", "/v2/assets", "key", 12345, b"bodY").unwrap(),
        ];

        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn test_method_case_is_preserved() {
        let key = SigningKey::from_base64(SECRET).unwrap();
        let upper = key.sign("GET", "/v2/assets", "key", 1, b"").unwrap();
        let lower = key.sign("get", "/v2/assets", "key", 1, b"").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_delimiter_cannot_shift_fields() {
        // ("/a;b", "key") and ("/a", "b;key") would produce the same message.
        let key = SigningKey::from_base64(SECRET).unwrap();

        let shifted_path = key.sign("GET", "/a;b", "key", 1, b"");
        assert!(matches!(shifted_path, Err(DetectifyError::UnsignableRequest(_))));

        let shifted_key = key.sign("GET", "/a", "b;key", 1, b"");
        assert!(matches!(shifted_key, Err(DetectifyError::UnsignableRequest(_))));

        let shifted_method = key.sign("GET;/a", "/b", "key", 1, b"");
        assert!(matches!(shifted_method, Err(DetectifyError::UnsignableRequest(_))));
    }

    #[test]
    fn test_delimiter_in_body_is_bound() {
        let key = SigningKey::from_base64(SECRET).unwrap();
        let sig1 = key.sign("POST", "/v2/assets", "key", 1, b"a;b").unwrap();
        let sig2 = key.sign("POST", "/v2/assets", "key", 1, b"a;c").unwrap();
        assert_ne!(sig1, sig2);
    }

    #[test]
    fn test_canonical_message_layout() {
        let message = canonical_message("GET", "/v2/assets", "abc123", 1700000000, b"").unwrap();
        assert_eq!(message, b"GET;/v2/assets;abc123;1700000000;");

        let message = canonical_message("PUT", "/x", "k", 7, &[0xff, 0x00]).unwrap();
        assert_eq!(message, b"PUT;/x;k;7;\xff\x00");
    }

    #[test]
    fn test_calculate_rejects_delimiter_fields() {
        let result = calculate_signature("GET", "/v2/assets;x", "key", SECRET, 1, b"");
        assert!(matches!(result, Err(DetectifyError::UnsignableRequest(_))));
    }

    #[test]
    fn test_invalid_base64_secret() {
        let result = calculate_signature("GET", "/v2/assets", "key", "not-base64!!", 1, b"");
        assert!(matches!(result, Err(DetectifyError::InvalidSecret(_))));
    }

    #[test]
    fn test_signing_key_debug_redacted() {
        let key = SigningKey::from_base64(SECRET).unwrap();
        let debug_str = format!("{key:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret"));
    }
}
