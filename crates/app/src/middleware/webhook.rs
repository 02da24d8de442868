//! Webhook delivery extractor.
//!
//! Shopify signs every delivery with the app secret. The body is only handed
//! to a handler after the `X-Shopify-Hmac-Sha256` header matches it; the shop
//! and topic are taken from the delivery headers.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use order_sync_core::{ShopDomain, WebhookTopic};
use serde_json::json;

use crate::state::AppState;

/// Header carrying the base64 HMAC of the body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
/// Header carrying the event topic, e.g. `orders/create`.
pub const TOPIC_HEADER: &str = "x-shopify-topic";
/// Header carrying the shop the event belongs to.
pub const SHOP_HEADER: &str = "x-shopify-shop-domain";
/// Header carrying Shopify's delivery id.
pub const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";

/// An authenticated webhook delivery.
#[derive(Debug, Clone)]
pub struct VerifiedWebhook {
    /// Event topic.
    pub topic: WebhookTopic,
    /// Shop the event belongs to.
    pub shop: ShopDomain,
    /// Delivery id, when Shopify sent one.
    pub webhook_id: Option<String>,
    /// Raw body exactly as signed.
    pub body: Bytes,
}

/// Reasons a delivery is rejected before processing.
#[derive(Debug, thiserror::Error)]
pub enum WebhookRejection {
    /// A required header is absent or not valid text.
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    /// A header is present but not usable.
    #[error("invalid header {header}: {reason}")]
    InvalidHeader {
        /// Header name.
        header: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The body could not be read.
    #[error("unreadable body")]
    Body,

    /// The HMAC did not match the body.
    #[error("invalid signature")]
    InvalidSignature,
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::MissingHeader(_) | Self::InvalidHeader { .. } | Self::Body => {
                StatusCode::BAD_REQUEST
            }
        };

        tracing::warn!(error = %self, status = status.as_u16(), "Webhook rejected");

        (
            status,
            Json(json!({ "received": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookRejection> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(WebhookRejection::MissingHeader(name))
}

impl FromRequest<AppState> for VerifiedWebhook {
    type Rejection = WebhookRejection;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let headers = req.headers();

        let signature = header(headers, HMAC_HEADER)?.to_owned();

        let topic = WebhookTopic::parse(header(headers, TOPIC_HEADER)?).map_err(|e| {
            WebhookRejection::InvalidHeader {
                header: TOPIC_HEADER,
                reason: e.to_string(),
            }
        })?;

        let shop = ShopDomain::parse(header(headers, SHOP_HEADER)?).map_err(|e| {
            WebhookRejection::InvalidHeader {
                header: SHOP_HEADER,
                reason: e.to_string(),
            }
        })?;

        let webhook_id = header(headers, WEBHOOK_ID_HEADER).ok().map(str::to_owned);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| WebhookRejection::Body)?;

        state
            .shopify()
            .verify_webhook(&body, &signature)
            .map_err(|_| WebhookRejection::InvalidSignature)?;

        Ok(Self {
            topic,
            shop,
            webhook_id,
            body,
        })
    }
}
