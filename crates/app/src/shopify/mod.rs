//! Shopify platform integration: OAuth install and request signatures.

pub mod oauth;
pub mod signature;

use thiserror::Error;

pub use oauth::ShopifyAuth;

/// Errors from talking to, or verifying requests from, Shopify.
#[derive(Debug, Error)]
pub enum ShopifyAuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OAuth handshake failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Request signature did not verify.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
