//! In-memory store implementations.
//!
//! Same semantics as the `PostgreSQL` stores (shop scoping, the
//! `(shop, shopify_order_id)` uniqueness, newest-first listing) without a
//! database. Compiled for tests and behind the `memory-store` feature.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use order_sync_core::{NewOrder, OrderId, OrderRecord, ShopDomain, ShopifyOrderId};
use tokio::sync::Mutex;

use super::{InsertOutcome, InstallationStore, OrderStore, RepositoryError, ShopInstallation};

#[derive(Debug, Default)]
struct OrderTable {
    last_id: i32,
    rows: Vec<OrderRecord>,
}

/// Order store holding rows in a vector.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    table: Mutex<OrderTable>,
}

impl MemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows across all shops.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &NewOrder) -> Result<InsertOutcome, RepositoryError> {
        let mut table = self.table.lock().await;

        let exists = table
            .rows
            .iter()
            .any(|r| r.shop == order.shop && r.shopify_order_id == order.shopify_order_id);
        if exists {
            return Ok(InsertOutcome::Duplicate);
        }

        table.last_id += 1;
        let record = OrderRecord {
            id: OrderId::new(table.last_id),
            shop: order.shop.clone(),
            shopify_order_id: order.shopify_order_id.clone(),
            customer_name: order.customer_name.clone(),
            total_price: order.total_price.clone(),
            created_at: Utc::now(),
        };
        table.rows.push(record.clone());

        Ok(InsertOutcome::Inserted(record))
    }

    async fn delete_by_shopify_id(
        &self,
        shop: &ShopDomain,
        shopify_order_id: &ShopifyOrderId,
    ) -> Result<u64, RepositoryError> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table
            .rows
            .retain(|r| !(r.shop == *shop && r.shopify_order_id == *shopify_order_id));

        Ok((before - table.rows.len()) as u64)
    }

    async fn list_for_shop(&self, shop: &ShopDomain) -> Result<Vec<OrderRecord>, RepositoryError> {
        let table = self.table.lock().await;
        let mut rows: Vec<OrderRecord> = table
            .rows
            .iter()
            .filter(|r| r.shop == *shop)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Installation store holding rows in a map.
#[derive(Debug, Default)]
pub struct MemoryInstallationStore {
    rows: Mutex<HashMap<ShopDomain, ShopInstallation>>,
}

impl MemoryInstallationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstallationStore for MemoryInstallationStore {
    async fn save(&self, installation: &ShopInstallation) -> Result<(), RepositoryError> {
        self.rows
            .lock()
            .await
            .insert(installation.shop.clone(), installation.clone());
        Ok(())
    }

    async fn find(&self, shop: &ShopDomain) -> Result<Option<ShopInstallation>, RepositoryError> {
        Ok(self.rows.lock().await.get(shop).cloned())
    }
}
