//! Error types for the Detectify client library.

use thiserror::Error;

/// The main error type for all Detectify client operations.
#[derive(Error, Debug)]
pub enum DetectifyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// The signature secret is not valid base64
    #[error("Signature secret must be valid base64: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    /// Invalid client or credential configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request cannot be turned into an unambiguous canonical message
    #[error("Request cannot be signed: {0}")]
    UnsignableRequest(String),
}

impl DetectifyError {
    /// Check if this error was raised before the request left the process.
    ///
    /// Configuration and signing failures abort the request; transport failures
    /// happen after it was handed to the network layer. Middleware errors that do
    /// not carry a `DetectifyError` come from the retry layer giving up after
    /// network attempts, and count as transport failures. The client buffers
    /// streaming bodies before that layer, so it never rejects a request unsent.
    pub fn is_local(&self) -> bool {
        match self {
            Self::InvalidSecret(_)
            | Self::Configuration(_)
            | Self::UnsignableRequest(_)
            | Self::Url(_) => true,
            Self::HttpMiddleware(reqwest_middleware::Error::Middleware(inner)) => inner
                .downcast_ref::<DetectifyError>()
                .is_some_and(DetectifyError::is_local),
            Self::Http(_) | Self::HttpMiddleware(_) => false,
        }
    }

    /// Extract the authentication error carried inside a middleware error, if any.
    ///
    /// The signing middleware reports its failures through
    /// [`reqwest_middleware::Error::Middleware`]; this recovers the typed error.
    pub fn from_middleware(error: &reqwest_middleware::Error) -> Option<&DetectifyError> {
        match error {
            reqwest_middleware::Error::Middleware(inner) => inner.downcast_ref::<DetectifyError>(),
            _ => None,
        }
    }
}
