//! Shopify webhook endpoint.
//!
//! Every delivery gets an acknowledgement body. A failure acknowledgement
//! carries a non-2xx status so Shopify's retry policy decides on redelivery.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::middleware::VerifiedWebhook;
use crate::services::webhooks::{self, WebhookError};
use crate::state::AppState;

/// Response body for a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Whether the delivery was processed.
    pub received: bool,
    /// Failure description, present only when `received` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Acknowledgement {
    /// A success acknowledgement.
    #[must_use]
    pub const fn received() -> Self {
        Self {
            received: true,
            error: None,
        }
    }

    /// A failure acknowledgement with a description.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            received: false,
            error: Some(error.into()),
        }
    }
}

/// POST /webhooks - Apply a signed Shopify delivery.
pub async fn receive(State(state): State<AppState>, webhook: VerifiedWebhook) -> Response {
    tracing::info!(
        shop = %webhook.shop,
        topic = %webhook.topic,
        webhook_id = webhook.webhook_id.as_deref().unwrap_or("-"),
        bytes = webhook.body.len(),
        "Webhook received"
    );

    match webhooks::process(state.orders(), &webhook.shop, &webhook.topic, &webhook.body).await {
        Ok(_) => (StatusCode::OK, Json(Acknowledgement::received())).into_response(),
        Err(e @ WebhookError::InvalidPayload(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(Acknowledgement::failed(e.to_string())),
        )
            .into_response(),
        Err(e @ WebhookError::Store(_)) => {
            sentry::capture_error(&e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Acknowledgement::failed(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /webhooks - Reachability probe for the endpoint.
pub async fn ready() -> Json<Value> {
    Json(json!({ "message": "Webhook endpoint ready" }))
}
