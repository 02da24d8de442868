//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{InstallationStore, OrderStore};
use crate::shopify::ShopifyAuth;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    orders: Arc<dyn OrderStore>,
    installations: Arc<dyn InstallationStore>,
    shopify: ShopifyAuth,
}

impl AppState {
    /// Build state from configuration and store handles.
    #[must_use]
    pub fn new(
        config: AppConfig,
        orders: Arc<dyn OrderStore>,
        installations: Arc<dyn InstallationStore>,
        shopify: ShopifyAuth,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders,
                installations,
                shopify,
            }),
        }
    }

    /// Get the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Get the installation store.
    #[must_use]
    pub fn installations(&self) -> &dyn InstallationStore {
        self.inner.installations.as_ref()
    }

    /// Get the Shopify OAuth client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyAuth {
        &self.inner.shopify
    }
}
