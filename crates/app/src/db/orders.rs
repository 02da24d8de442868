//! `PostgreSQL` order store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use order_sync_core::{NewOrder, OrderId, OrderRecord, ShopDomain, ShopifyOrderId};
use sqlx::PgPool;

use super::{InsertOutcome, OrderStore, RepositoryError};

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    shop: ShopDomain,
    shopify_order_id: ShopifyOrderId,
    customer_name: String,
    total_price: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            shop: row.shop,
            shopify_order_id: row.shopify_order_id,
            customer_name: row.customer_name,
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}

/// Order store backed by the `app.orders` table.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store over a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &NewOrder) -> Result<InsertOutcome, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO app.orders (shopify_order_id, shop, customer_name, total_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (shop, shopify_order_id) DO NOTHING
            RETURNING id, shop, shopify_order_id, customer_name, total_price, created_at
            ",
        )
        .bind(&order.shopify_order_id)
        .bind(&order.shop)
        .bind(&order.customer_name)
        .bind(&order.total_price)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(InsertOutcome::Inserted(row.into())),
            None => Ok(InsertOutcome::Duplicate),
        }
    }

    async fn delete_by_shopify_id(
        &self,
        shop: &ShopDomain,
        shopify_order_id: &ShopifyOrderId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM app.orders
            WHERE shop = $1 AND shopify_order_id = $2
            ",
        )
        .bind(shop)
        .bind(shopify_order_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_for_shop(&self, shop: &ShopDomain) -> Result<Vec<OrderRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, shop, shopify_order_id, customer_name, total_price, created_at
            FROM app.orders
            WHERE shop = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(shop)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
