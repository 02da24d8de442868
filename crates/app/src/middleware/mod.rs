//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is per-route through extractors: [`RequireShopSession`] for
//! merchant pages and [`VerifiedWebhook`] for Shopify deliveries.

pub mod auth;
pub mod session;
pub mod webhook;

pub use auth::{RequireShopSession, sign_in, sign_out};
pub use session::{create_session_layer, postgres_session_store};
pub use webhook::VerifiedWebhook;
