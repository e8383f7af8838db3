//! # Detectify Client
//!
//! An async Rust client for the Detectify API, focused on request authentication.
//!
//! ## Features
//!
//! - `X-Detectify-Key` on every request
//! - Optional HMAC-SHA256 request signing (`X-Detectify-Timestamp`, `X-Detectify-Signature`)
//! - Secrets validated once at configuration time and redacted from debug output
//! - A dedicated `reqwest-middleware` stack per configuration with tracing and retries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use detectify_api_client::DetectifyClient;
//! use detectify_api_client::auth::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("api_key", Some("c2VjcmV0"))?;
//!     let client = DetectifyClient::builder(credentials).build()?;
//!     let response = client.get("/v2/assets/")?.send().await?;
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

// Re-export commonly used types at crate root
pub use client::{DetectifyClient, DetectifyClientBuilder};
pub use error::DetectifyError;

/// Result type alias using DetectifyError
pub type Result<T> = std::result::Result<T, DetectifyError>;
