//! Authentication module for the Detectify API.
//!
//! This module provides:
//! - Credential management with redacted secret storage
//! - HMAC-SHA256 signature generation over the canonical request message
//! - A [`reqwest_middleware`] layer that authenticates every outgoing request

mod clock;
mod credentials;
mod middleware;
mod signature;

pub use clock::{Clock, FixedClock, SystemClock};
pub use credentials::Credentials;
pub(crate) use credentials::is_blank;
pub use middleware::{
    API_KEY_HEADER, AuthMiddleware, BufferBodyMiddleware, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use signature::{SIGNATURE_LEN, SigningKey, calculate_signature, canonical_message};
