//! Order webhook dispatch.
//!
//! Turns a verified delivery into at most one store call. Logging happens here
//! so the route only has to map the outcome onto an acknowledgement.

use order_sync_core::{
    OrderCancelledPayload, OrderCreatedPayload, PayloadError, ShopDomain, WebhookTopic,
};
use thiserror::Error;
use tracing::instrument;

use crate::db::{InsertOutcome, OrderStore, RepositoryError};

/// What processing a delivery did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A new order row was written.
    OrderRecorded {
        /// Platform order id.
        shopify_order_id: String,
    },
    /// The shop already had this order; nothing changed.
    DuplicateIgnored {
        /// Platform order id.
        shopify_order_id: String,
    },
    /// Rows matching the cancelled order were deleted.
    OrderRemoved {
        /// Platform order id.
        shopify_order_id: String,
        /// Number of rows deleted, possibly zero.
        affected: u64,
    },
    /// A cancellation arrived without an order id.
    MissingOrderId,
    /// The topic is not one this app handles.
    Ignored {
        /// Topic as received.
        topic: String,
    },
}

/// Errors from processing a delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The payload is malformed or lacks a required field.
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),

    /// The order store failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Apply one webhook delivery for `shop` to the order store.
///
/// # Errors
///
/// Returns `WebhookError::InvalidPayload` when an order-created body cannot
/// be turned into an order, and `WebhookError::Store` when the store fails.
#[instrument(skip_all, fields(shop = %shop, topic = %topic))]
pub async fn process(
    store: &dyn OrderStore,
    shop: &ShopDomain,
    topic: &WebhookTopic,
    body: &[u8],
) -> Result<WebhookOutcome, WebhookError> {
    let result = match topic {
        WebhookTopic::OrdersCreate => record_order(store, shop, body).await,
        WebhookTopic::OrdersCancelled => remove_order(store, shop, body).await,
        WebhookTopic::Other(other) => {
            tracing::info!(topic = %other, "Unhandled webhook topic");
            Ok(WebhookOutcome::Ignored {
                topic: other.clone(),
            })
        }
    };

    match &result {
        Err(WebhookError::InvalidPayload(e)) => {
            tracing::error!(error = %e, "Rejected webhook payload");
        }
        Err(WebhookError::Store(e)) => {
            tracing::error!(error = %e, "Failed to apply webhook");
        }
        Ok(_) => {}
    }

    result
}

async fn record_order(
    store: &dyn OrderStore,
    shop: &ShopDomain,
    body: &[u8],
) -> Result<WebhookOutcome, WebhookError> {
    let order = OrderCreatedPayload::from_slice(body)?.into_new_order(shop)?;
    let shopify_order_id = order.shopify_order_id.to_string();

    match store.insert(&order).await? {
        InsertOutcome::Inserted(record) => {
            tracing::info!(
                order_id = %record.id,
                shopify_order_id = %shopify_order_id,
                total_price = %record.total_price,
                "Order synced"
            );
            Ok(WebhookOutcome::OrderRecorded { shopify_order_id })
        }
        InsertOutcome::Duplicate => {
            tracing::info!(shopify_order_id = %shopify_order_id, "Order already synced");
            Ok(WebhookOutcome::DuplicateIgnored { shopify_order_id })
        }
    }
}

async fn remove_order(
    store: &dyn OrderStore,
    shop: &ShopDomain,
    body: &[u8],
) -> Result<WebhookOutcome, WebhookError> {
    let payload = OrderCancelledPayload::from_slice(body)?;

    let Some(id) = payload.order_id() else {
        tracing::warn!("Cancelled order payload has no id");
        return Ok(WebhookOutcome::MissingOrderId);
    };

    let affected = store.delete_by_shopify_id(shop, &id).await?;
    tracing::info!(shopify_order_id = %id, affected, "Cancelled order removed");

    Ok(WebhookOutcome::OrderRemoved {
        shopify_order_id: id.to_string(),
        affected,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use order_sync_core::{NewOrder, OrderRecord, ShopifyOrderId};

    use super::*;
    use crate::db::memory::MemoryOrderStore;

    /// Store whose every call fails.
    struct FailingStore;

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn insert(&self, _order: &NewOrder) -> Result<InsertOutcome, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn delete_by_shopify_id(
            &self,
            _shop: &ShopDomain,
            _id: &ShopifyOrderId,
        ) -> Result<u64, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_for_shop(
            &self,
            _shop: &ShopDomain,
        ) -> Result<Vec<OrderRecord>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn shop(name: &str) -> ShopDomain {
        ShopDomain::parse(&format!("{name}.myshopify.com")).unwrap()
    }

    const CREATE_BODY: &[u8] = br#"{
        "id": 123,
        "customer": {"first_name": "A", "last_name": "B"},
        "total_price": "10.00",
        "presentment_currency_code": "USD"
    }"#;

    #[tokio::test]
    async fn test_create_inserts_one_scoped_order() {
        let store = MemoryOrderStore::new();
        let outcome = process(&store, &shop("alpha"), &WebhookTopic::OrdersCreate, CREATE_BODY)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::OrderRecorded {
                shopify_order_id: "123".to_string()
            }
        );

        let rows = store.list_for_shop(&shop("alpha")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shopify_order_id.as_str(), "123");
        assert_eq!(rows[0].customer_name, "A B");
        assert_eq!(rows[0].total_price, "10.00 USD");
        assert!(store.list_for_shop(&shop("beta")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redelivered_create_keeps_one_row() {
        let store = MemoryOrderStore::new();
        let topic = WebhookTopic::OrdersCreate;
        process(&store, &shop("alpha"), &topic, CREATE_BODY).await.unwrap();
        let second = process(&store, &shop("alpha"), &topic, CREATE_BODY).await.unwrap();

        assert!(matches!(second, WebhookOutcome::DuplicateIgnored { .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_without_customer_uses_placeholder() {
        let store = MemoryOrderStore::new();
        let body = br#"{"id": 7, "total_price": "5.50", "presentment_currency_code": "EUR"}"#;
        process(&store, &shop("alpha"), &WebhookTopic::OrdersCreate, body)
            .await
            .unwrap();

        let rows = store.list_for_shop(&shop("alpha")).await.unwrap();
        assert_eq!(rows[0].customer_name, "Unknown Customer");
        assert_eq!(rows[0].total_price, "5.50 EUR");
    }

    #[tokio::test]
    async fn test_create_missing_total_fails_closed() {
        let store = MemoryOrderStore::new();
        let body = br#"{"id": 7, "presentment_currency_code": "EUR"}"#;
        let err = process(&store, &shop("alpha"), &WebhookTopic::OrdersCreate, body)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WebhookError::InvalidPayload(PayloadError::MissingField("total_price"))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_removes_only_matching_shop() {
        let store = MemoryOrderStore::new();
        let create = WebhookTopic::OrdersCreate;
        process(&store, &shop("alpha"), &create, CREATE_BODY).await.unwrap();
        process(&store, &shop("beta"), &create, CREATE_BODY).await.unwrap();

        let outcome = process(
            &store,
            &shop("alpha"),
            &WebhookTopic::OrdersCancelled,
            br#"{"id": 123}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::OrderRemoved {
                shopify_order_id: "123".to_string(),
                affected: 1
            }
        );
        assert!(store.list_for_shop(&shop("alpha")).await.unwrap().is_empty());
        assert_eq!(store.list_for_shop(&shop("beta")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_unknown_order_affects_nothing() {
        let store = MemoryOrderStore::new();
        let outcome = process(
            &store,
            &shop("alpha"),
            &WebhookTopic::OrdersCancelled,
            br#"{"id": 999}"#,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, WebhookOutcome::OrderRemoved { affected: 0, .. }));
    }

    #[tokio::test]
    async fn test_cancel_without_id_is_a_noop() {
        let store = MemoryOrderStore::new();
        process(&store, &shop("alpha"), &WebhookTopic::OrdersCreate, CREATE_BODY)
            .await
            .unwrap();

        let outcome = process(&store, &shop("alpha"), &WebhookTopic::OrdersCancelled, b"{}")
            .await
            .unwrap();

        assert_eq!(outcome, WebhookOutcome::MissingOrderId);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_topic_is_ignored() {
        let store = MemoryOrderStore::new();
        let topic = WebhookTopic::parse("products/update").unwrap();
        let outcome = process(&store, &shop("alpha"), &topic, CREATE_BODY)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                topic: "PRODUCTS_UPDATE".to_string()
            }
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let err = process(&FailingStore, &shop("alpha"), &WebhookTopic::OrdersCreate, CREATE_BODY)
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::Store(_)));
        assert!(!err.to_string().is_empty());
    }
}
