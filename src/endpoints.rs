//! Detectify API endpoint constants.

/// Base URL for the Detectify API.
pub const DETECTIFY_BASE_URL: &str = "https://api.detectify.com";

/// Asset inventory listing.
pub const ASSETS: &str = "/v2/assets/";
