//! Shopify OAuth install handshake.

use std::sync::Arc;
use std::time::Duration;

use order_sync_core::ShopDomain;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{ShopifyAuthError, signature};
use crate::config::ShopifyAppConfig;
use crate::db::ShopInstallation;

/// Access token response from `/admin/oauth/access_token`.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    scope: String,
}

/// Client for the OAuth endpoints of a Shopify app.
///
/// Cheap to clone; the HTTP client and credentials are shared.
#[derive(Clone)]
pub struct ShopifyAuth {
    inner: Arc<ShopifyAuthInner>,
}

struct ShopifyAuthInner {
    http: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    scopes: Vec<String>,
    token_url: Option<String>,
}

impl std::fmt::Debug for ShopifyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAuth")
            .field("api_key", &self.inner.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("scopes", &self.inner.scopes)
            .finish_non_exhaustive()
    }
}

impl ShopifyAuth {
    /// Create a new OAuth client from app credentials.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyAuthError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAppConfig) -> Result<Self, ShopifyAuthError> {
        Self::build(config, None)
    }

    /// Create a client whose token exchange posts to `token_url` instead of
    /// the shop's own `/admin/oauth/access_token`.
    ///
    /// Used with local tunnels and stub servers in tests.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyAuthError::Http` if the HTTP client cannot be built.
    pub fn with_token_url(
        config: &ShopifyAppConfig,
        token_url: impl Into<String>,
    ) -> Result<Self, ShopifyAuthError> {
        Self::build(config, Some(token_url.into()))
    }

    fn build(
        config: &ShopifyAppConfig,
        token_url: Option<String>,
    ) -> Result<Self, ShopifyAuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyAuthInner {
                http,
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                scopes: config.scopes.clone(),
                token_url,
            }),
        })
    }

    /// Scopes requested during install.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.inner.scopes
    }

    fn secret(&self) -> &[u8] {
        self.inner.api_secret.expose_secret().as_bytes()
    }

    /// Generate the OAuth authorization URL for a shop.
    #[must_use]
    pub fn authorization_url(&self, shop: &ShopDomain, redirect_uri: &str, state: &str) -> String {
        let scope = self.inner.scopes.join(",");
        format!(
            "https://{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
            shop,
            urlencoding::encode(&self.inner.api_key),
            urlencoding::encode(&scope),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Verify the `hmac` parameter of a redirect back from Shopify.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyAuthError::InvalidSignature` on a missing or bad signature.
    pub fn verify_redirect(&self, params: &[(String, String)]) -> Result<(), ShopifyAuthError> {
        signature::verify_query(self.secret(), params)
    }

    /// Verify a webhook body against its `X-Shopify-Hmac-Sha256` header.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyAuthError::InvalidSignature` on a bad signature.
    pub fn verify_webhook(&self, body: &[u8], header_value: &str) -> Result<(), ShopifyAuthError> {
        signature::verify_webhook_body(self.secret(), body, header_value)
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyAuthError::OAuth` if Shopify rejects the exchange and
    /// `ShopifyAuthError::Http` if the request fails.
    #[instrument(skip_all, fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<ShopInstallation, ShopifyAuthError> {
        let url = self
            .inner
            .token_url
            .clone()
            .unwrap_or_else(|| format!("https://{shop}/admin/oauth/access_token"));

        let params = [
            ("client_id", self.inner.api_key.as_str()),
            ("client_secret", self.inner.api_secret.expose_secret()),
            ("code", code),
        ];

        let response = self.inner.http.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyAuthError::OAuth(format!(
                "Token exchange failed ({status}): {text}"
            )));
        }

        let token: AccessTokenResponse = response.json().await?;

        Ok(ShopInstallation {
            shop: shop.clone(),
            access_token: SecretString::from(token.access_token),
            scopes: token
                .scope
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            obtained_at: chrono::Utc::now(),
        })
    }
}
