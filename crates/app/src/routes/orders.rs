//! Synced order list page.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use order_sync_core::OrderRecord;

use crate::error::AppError;
use crate::middleware::RequireShopSession;
use crate::state::AppState;

/// Link shown in the empty state.
const WEBHOOKS_DOCS_URL: &str = "https://shopify.dev/apps/webhooks";

/// Order row prepared for display.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub shopify_order_id: String,
    pub customer_name: String,
    pub total_price: String,
    pub created_at: String,
}

impl From<&OrderRecord> for OrderView {
    fn from(order: &OrderRecord) -> Self {
        Self {
            shopify_order_id: order.shopify_order_id.to_string(),
            customer_name: order.customer_name.clone(),
            total_price: order.total_price.clone(),
            created_at: order.created_at.format("%b %-d, %Y").to_string(),
        }
    }
}

/// Order list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub shop: String,
    pub orders: Vec<OrderView>,
    pub docs_url: &'static str,
}

/// GET /app - Orders synced for the signed-in shop, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireShopSession(shop): RequireShopSession,
) -> Result<Response, AppError> {
    let orders = state.orders().list_for_shop(&shop).await?;

    tracing::debug!(shop = %shop, count = orders.len(), "Listing synced orders");

    let template = OrdersIndexTemplate {
        shop: shop.to_string(),
        orders: orders.iter().map(OrderView::from).collect(),
        docs_url: WEBHOOKS_DOCS_URL,
    };

    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response())
}
