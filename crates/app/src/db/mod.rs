//! Database operations for order sync `PostgreSQL`.
//!
//! ## Tables (schema `app`)
//!
//! - `orders` - Orders received via webhooks, unique per `(shop, shopify_order_id)`
//! - `shop_installation` - OAuth access tokens from the install handshake
//! - `session` - Admin browser sessions (tower-sessions)
//!
//! # Store handles
//!
//! Handlers never touch the pool directly. They receive the [`OrderStore`] and
//! [`InstallationStore`] handles built by `main` and carried in `AppState`,
//! which keeps tenant scoping in one place and lets tests swap in the
//! in-memory implementations.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/app/migrations/` and run via:
//! ```bash
//! cargo run -p order-sync-cli -- migrate
//! ```

pub mod installations;
#[cfg(any(test, feature = "memory-store"))]
pub mod memory;
pub mod orders;

use std::time::Duration;

use async_trait::async_trait;
use order_sync_core::{NewOrder, OrderRecord, ShopDomain, ShopifyOrderId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use installations::{PgInstallationStore, ShopInstallation};
pub use orders::PgOrderStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of inserting an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted(OrderRecord),
    /// A row for the same `(shop, shopify_order_id)` already exists; nothing changed.
    Duplicate,
}

/// Persistence for synced orders.
///
/// Every read and write is scoped by shop.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order unless the shop already has a row for its id.
    async fn insert(&self, order: &NewOrder) -> Result<InsertOutcome, RepositoryError>;

    /// Delete every row matching `(shop, shopify_order_id)`, returning the count.
    async fn delete_by_shopify_id(
        &self,
        shop: &ShopDomain,
        shopify_order_id: &ShopifyOrderId,
    ) -> Result<u64, RepositoryError>;

    /// All orders of a shop, newest first.
    async fn list_for_shop(&self, shop: &ShopDomain) -> Result<Vec<OrderRecord>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Persistence for OAuth installations.
#[async_trait]
pub trait InstallationStore: Send + Sync {
    /// Save or replace the installation of a shop.
    async fn save(&self, installation: &ShopInstallation) -> Result<(), RepositoryError>;

    /// Look up the installation of a shop.
    async fn find(&self, shop: &ShopDomain) -> Result<Option<ShopInstallation>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url.expose_secret())
        .await
}
