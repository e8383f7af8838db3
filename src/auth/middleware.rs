//! Request authentication middleware.
//!
//! [`AuthMiddleware`] sits in a [`reqwest_middleware`] chain and adds the
//! Detectify authentication headers to every outgoing request:
//!
//! - `X-Detectify-Key`: always, with the plaintext API key
//! - `X-Detectify-Timestamp`: when signing is enabled, unix seconds
//! - `X-Detectify-Signature`: when signing is enabled, see [`calculate_signature`]
//!
//! The request is otherwise passed to the next link untouched, and whatever that
//! link returns is handed back to the caller as is.
//!
//! [`calculate_signature`]: crate::auth::calculate_signature

use std::sync::Arc;

use async_trait::async_trait;
use http::Extensions;
use http_body_util::BodyExt;
use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Body, Request, Response};
use reqwest_middleware::{Middleware, Next};
use tracing::{debug, warn};

use crate::auth::{Clock, Credentials, SystemClock};
use crate::error::DetectifyError;

/// Header carrying the plaintext API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-detectify-key");

/// Header carrying the signing timestamp in unix seconds.
pub const TIMESTAMP_HEADER: HeaderName = HeaderName::from_static("x-detectify-timestamp");

/// Header carrying the base64 HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: HeaderName = HeaderName::from_static("x-detectify-signature");

/// Middleware that authenticates every request passing through it.
///
/// The middleware only holds immutable state, so a single instance can serve any
/// number of concurrent requests. Per-request headers are built inside each call
/// and never stored on the middleware.
///
/// # Example
///
/// ```rust,no_run
/// use detectify_api_client::auth::{AuthMiddleware, Credentials};
/// use reqwest_middleware::ClientBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("abc123", Some("c2VjcmV0"))?;
/// let client = ClientBuilder::new(reqwest::Client::new())
///     .with(AuthMiddleware::new(credentials)?)
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct AuthMiddleware {
    credentials: Arc<Credentials>,
    static_headers: HeaderMap,
    clock: Arc<dyn Clock>,
}

impl AuthMiddleware {
    /// Create a middleware that reads timestamps from the system clock.
    pub fn new(credentials: Credentials) -> Result<Self, DetectifyError> {
        Self::with_clock(credentials, Arc::new(SystemClock))
    }

    /// Create a middleware with a custom clock.
    pub fn with_clock(
        credentials: Credentials,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DetectifyError> {
        let api_key = HeaderValue::from_str(credentials.api_key()).map_err(|_| {
            DetectifyError::Configuration("API key is not a valid header value".to_string())
        })?;

        let mut static_headers = HeaderMap::new();
        static_headers.insert(API_KEY_HEADER, api_key);

        Ok(Self {
            credentials: Arc::new(credentials),
            static_headers,
            clock,
        })
    }

    /// Add a header that is set on every request, overriding caller-set values.
    pub fn with_static_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.static_headers.append(name, value);
        self
    }

    /// The credentials this middleware authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Attach authentication headers to a request.
    ///
    /// On error the request must not be sent. No authentication header is written
    /// unless the whole operation succeeds.
    pub async fn authenticate(&self, request: &mut Request) -> Result<(), DetectifyError> {
        let mut signed_headers = HeaderMap::new();

        if let Some(signing_key) = self.credentials.signing_key() {
            let timestamp = self.clock.unix_timestamp();
            let body = materialize_body(request).await?;
            let path = signing_path(request)?;

            let signature = signing_key.sign(
                request.method().as_str(),
                &path,
                self.credentials.api_key(),
                timestamp,
                &body,
            )?;
            let signature = HeaderValue::from_str(&signature).map_err(|_| {
                DetectifyError::UnsignableRequest("signature is not a valid header value".into())
            })?;

            signed_headers.insert(TIMESTAMP_HEADER, HeaderValue::from(timestamp));
            signed_headers.insert(SIGNATURE_HEADER, signature);

            debug!(
                method = %request.method(),
                path = %path,
                timestamp,
                body_len = body.len(),
                "signed Detectify request"
            );
        }

        let headers = request.headers_mut();
        headers.extend(signed_headers);
        for name in self.static_headers.keys() {
            headers.remove(name);
            for value in self.static_headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for AuthMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMiddleware")
            .field("credentials", &self.credentials)
            .field("static_headers", &self.static_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if let Err(error) = self.authenticate(&mut req).await {
            warn!(
                method = %req.method(),
                path = req.url().path(),
                %error,
                "refusing to send Detectify request"
            );
            return Err(reqwest_middleware::Error::middleware(error));
        }

        next.run(req, extensions).await
    }
}

/// Middleware that turns streaming request bodies into buffered ones.
///
/// Retry layers have to clone a request before every attempt, which a streaming
/// body does not allow. Placed in front of such a layer, this lets streamed
/// uploads be retried and reach [`AuthMiddleware`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferBodyMiddleware;

#[async_trait]
impl Middleware for BufferBodyMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if req.body().is_some_and(|body| body.as_bytes().is_none()) {
            let body = materialize_body(&mut req)
                .await
                .map_err(reqwest_middleware::Error::middleware)?;
            debug!(body_len = body.len(), "buffered streaming request body");
        }

        next.run(req, extensions).await
    }
}

/// The decoded URL path that goes into the canonical message.
///
/// The query is not part of it, and percent-escapes are decoded, so
/// `/v2/assets/a%20b` is signed as `/v2/assets/a b`.
fn signing_path(request: &Request) -> Result<String, DetectifyError> {
    percent_decode_str(request.url().path())
        .decode_utf8()
        .map(|path| path.into_owned())
        .map_err(|_| {
            DetectifyError::UnsignableRequest("path is not valid UTF-8 once decoded".into())
        })
}

/// Read the request body into memory for signing.
///
/// Buffered bodies are copied. Streaming bodies are collected and replaced on the
/// request with the collected bytes, so the payload that is signed is exactly the
/// payload that is sent.
async fn materialize_body(request: &mut Request) -> Result<Vec<u8>, DetectifyError> {
    if let Some(bytes) = request.body().and_then(Body::as_bytes) {
        return Ok(bytes.to_vec());
    }

    let Some(body) = request.body_mut().take() else {
        return Ok(Vec::new());
    };

    let collected = BodyExt::collect(body)
        .await
        .map_err(|e| DetectifyError::UnsignableRequest(format!("failed to read request body: {e}")))?
        .to_bytes();

    let bytes = collected.to_vec();
    *request.body_mut() = Some(Body::from(collected));
    Ok(bytes)
}
