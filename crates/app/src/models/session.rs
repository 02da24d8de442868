//! Session-related types for merchant authentication.

/// Session keys for merchant authentication data.
pub mod keys {
    /// Key for the shop domain of the signed-in merchant.
    pub const CURRENT_SHOP: &str = "current_shop";

    /// Key for the anti-forgery nonce sent with the OAuth redirect.
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for the shop the pending OAuth handshake was started for.
    pub const OAUTH_SHOP: &str = "oauth_shop";
}
