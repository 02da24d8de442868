//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Liveness
//! GET  /health/ready    - Readiness (store reachable)
//!
//! # Webhooks (Shopify HMAC)
//! POST /webhooks        - Order created / cancelled deliveries
//! GET  /webhooks        - Endpoint probe
//!
//! # Orders (shop session)
//! GET  /                - Redirect to /app
//! GET  /app             - Synced orders for the signed-in shop
//!
//! # Auth
//! GET  /auth/login      - Shop domain form
//! GET  /auth            - Start OAuth install
//! GET  /auth/callback   - Finish OAuth install
//! POST /auth/logout     - Sign out
//! ```

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod orders;
pub mod webhooks;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Webhooks
        .route("/webhooks", post(webhooks::receive).get(webhooks::ready))
        // Orders
        .route("/", get(|| async { Redirect::to("/app") }))
        .route("/app", get(orders::index))
        // Auth
        .route("/auth", get(auth::begin))
        .route("/auth/login", get(auth::login_page))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
}
