//! Authenticated Detectify HTTP client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;
use tracing::debug;
use url::Url;

use crate::auth::{AuthMiddleware, BufferBodyMiddleware, Clock, Credentials, SystemClock};
use crate::config::ProviderConfig;
use crate::endpoints::DETECTIFY_BASE_URL;
use crate::error::DetectifyError;

/// A Detectify API client owning its own authenticated HTTP stack.
///
/// Every request built from this client passes through [`AuthMiddleware`], so it
/// leaves the process with the `X-Detectify-Key` header and, when a signature
/// secret is configured, a fresh timestamp and HMAC signature.
///
/// Each configuration gets a dedicated client; nothing is installed on a shared
/// or global HTTP client.
///
/// # Example
///
/// ```rust,no_run
/// use detectify_api_client::DetectifyClient;
/// use detectify_api_client::config::ProviderConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ProviderConfig::from_env()?;
///     let client = DetectifyClient::from_config(&config)?;
///
///     let response = client.get("/v2/assets/")?.send().await?;
///     println!("Status: {}", response.status());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DetectifyClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    signing: bool,
}

impl DetectifyClient {
    /// Create a new client builder for the given credentials.
    pub fn builder(credentials: Credentials) -> DetectifyClientBuilder {
        DetectifyClientBuilder::new(credentials)
    }

    /// Build a client from provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, DetectifyError> {
        let mut builder = Self::builder(config.credentials()?);
        if let Some(base_url) = &config.base_url {
            builder = builder.base_url(base_url.clone());
        }
        builder.build()
    }

    /// The underlying middleware client, for requests outside [`DetectifyClient::request`].
    pub fn http_client(&self) -> &ClientWithMiddleware {
        &self.http_client
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests from this client are HMAC signed.
    pub fn is_signing(&self) -> bool {
        self.signing
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, DetectifyError> {
        let url = Url::parse(&format!("{}{}", self.base_url, path))?;
        Ok(url)
    }

    /// Start a request to an endpoint path.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, DetectifyError> {
        let url = self.endpoint(path)?;
        Ok(self.http_client.request(method, url))
    }

    /// Start a GET request.
    pub fn get(&self, path: &str) -> Result<RequestBuilder, DetectifyError> {
        self.request(Method::GET, path)
    }

    /// Start a POST request.
    pub fn post(&self, path: &str) -> Result<RequestBuilder, DetectifyError> {
        self.request(Method::POST, path)
    }

    /// Start a PUT request.
    pub fn put(&self, path: &str) -> Result<RequestBuilder, DetectifyError> {
        self.request(Method::PUT, path)
    }

    /// Start a DELETE request.
    pub fn delete(&self, path: &str) -> Result<RequestBuilder, DetectifyError> {
        self.request(Method::DELETE, path)
    }
}

impl std::fmt::Debug for DetectifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectifyClient")
            .field("base_url", &self.base_url)
            .field("signing", &self.signing)
            .finish()
    }
}

/// Builder for [`DetectifyClient`].
pub struct DetectifyClientBuilder {
    credentials: Credentials,
    base_url: String,
    clock: Option<Arc<dyn Clock>>,
    static_headers: Vec<(HeaderName, HeaderValue)>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    max_retries: u32,
}

impl DetectifyClientBuilder {
    /// Create a new builder with default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DETECTIFY_BASE_URL.to_string(),
            clock: None,
            static_headers: Vec::new(),
            user_agent: None,
            timeout: None,
            max_retries: 0,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom clock for signing timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add a header set on every request, overriding caller-set values.
    pub fn static_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.static_headers.push((name, value));
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries for transient failures (default: none).
    ///
    /// Retries run outside the authentication layer, so each attempt carries its
    /// own timestamp and signature. Streaming bodies are buffered ahead of the retry
    /// layer so that they can be replayed.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DetectifyClient, DetectifyError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("detectify-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("detectify-api-client"));
        headers.insert(USER_AGENT, header_value);

        let mut reqwest_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            reqwest_builder = reqwest_builder.timeout(timeout);
        }
        let reqwest_client = reqwest_builder.build()?;

        let signing = self.credentials.is_signing();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let mut auth = AuthMiddleware::with_clock(self.credentials, clock)?;
        for (name, value) in self.static_headers {
            auth = auth.with_static_header(name, value);
        }

        let mut middleware = ClientBuilder::new(reqwest_client).with(TracingMiddleware::default());
        if self.max_retries > 0 {
            let retry_policy =
                ExponentialBackoff::builder().build_with_max_retries(self.max_retries);
            middleware = middleware
                .with(BufferBodyMiddleware)
                .with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }
        let client = middleware.with(auth).build();

        debug!(base_url = %base_url, signing, "built Detectify client");

        Ok(DetectifyClient {
            http_client: client,
            base_url,
            signing,
        })
    }
}
