//! Typed webhook payloads.
//!
//! Each topic this app acts on has its own payload type. Deserialization is
//! lenient about extra fields (Shopify sends the full order resource) but
//! validation is strict: [`OrderCreatedPayload::into_new_order`] rejects a
//! payload missing anything needed to build a record instead of writing a
//! half-empty row.

use serde::{Deserialize, Deserializer};

use crate::types::{NewOrder, Price, PriceError, ShopDomain, ShopifyOrderId, customer_display_name};

/// Errors raised while decoding or validating a webhook payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The body is not a JSON object of the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// A required field is absent, null, or blank.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    /// A field is present but unusable.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Customer block of an order payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPayload {
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Payload of an `orders/create` delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderCreatedPayload {
    /// Platform order id (JSON number or string).
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Customer, absent for guest or POS orders.
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    /// Order total (JSON string or number).
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_price: Option<String>,
    /// Currency the customer paid in.
    #[serde(default)]
    pub presentment_currency_code: Option<String>,
    /// Alternative spelling used by some API versions.
    #[serde(default)]
    pub currency_code: Option<String>,
    /// REST resource spelling of the presentment currency.
    #[serde(default)]
    pub presentment_currency: Option<String>,
    /// Shop currency.
    #[serde(default)]
    pub currency: Option<String>,
}

impl OrderCreatedPayload {
    /// Decode a payload from a raw request body.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Malformed` if the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// First non-blank currency field, in order of preference.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        [
            &self.presentment_currency_code,
            &self.currency_code,
            &self.presentment_currency,
            &self.currency,
        ]
        .into_iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|c| !c.is_empty())
    }

    /// Validate the payload and build the record to insert for `shop`.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingField` for an absent id, total or
    /// currency, and `PayloadError::InvalidField` for a malformed total or
    /// currency code.
    pub fn into_new_order(self, shop: &ShopDomain) -> Result<NewOrder, PayloadError> {
        let shopify_order_id = self
            .id
            .clone()
            .and_then(ShopifyOrderId::new)
            .ok_or(PayloadError::MissingField("id"))?;

        let amount = self
            .total_price
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(PayloadError::MissingField("total_price"))?;

        let currency = self
            .currency()
            .ok_or(PayloadError::MissingField("presentment_currency_code"))?;

        let price = Price::parse(amount, currency).map_err(|e| match e {
            PriceError::InvalidAmount(_) => PayloadError::InvalidField {
                field: "total_price",
                reason: e.to_string(),
            },
            PriceError::InvalidCurrency(_) => PayloadError::InvalidField {
                field: "presentment_currency_code",
                reason: e.to_string(),
            },
        })?;

        let customer_name = customer_display_name(
            self.customer
                .as_ref()
                .map(|c| (c.first_name.as_deref(), c.last_name.as_deref())),
        );

        Ok(NewOrder {
            shop: shop.clone(),
            shopify_order_id,
            customer_name,
            total_price: price.to_string(),
        })
    }
}

/// Payload of an `orders/cancelled` delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderCancelledPayload {
    /// Platform order id (JSON number or string).
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

impl OrderCancelledPayload {
    /// Decode a payload from a raw request body.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Malformed` if the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// The cancelled order's id, if the payload carried a usable one.
    #[must_use]
    pub fn order_id(&self) -> Option<ShopifyOrderId> {
        self.id.clone().and_then(ShopifyOrderId::new)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_CUSTOMER;

    fn shop() -> ShopDomain {
        ShopDomain::parse("demo.myshopify.com").unwrap()
    }

    #[test]
    fn test_created_payload_builds_record() {
        let body = br#"{
            "id": 123,
            "customer": {"first_name": "A", "last_name": "B"},
            "total_price": "10.00",
            "presentment_currency_code": "USD"
        }"#;

        let order = OrderCreatedPayload::from_slice(body)
            .unwrap()
            .into_new_order(&shop())
            .unwrap();

        assert_eq!(order.shop, shop());
        assert_eq!(order.shopify_order_id.as_str(), "123");
        assert_eq!(order.customer_name, "A B");
        assert_eq!(order.total_price, "10.00 USD");
    }

    #[test]
    fn test_created_payload_without_customer() {
        let body = br#"{"id": "9", "customer": null, "total_price": "5.50", "currency": "cad"}"#;

        let order = OrderCreatedPayload::from_slice(body)
            .unwrap()
            .into_new_order(&shop())
            .unwrap();

        assert_eq!(order.customer_name, UNKNOWN_CUSTOMER);
        assert_eq!(order.total_price, "5.50 CAD");
    }

    #[test]
    fn test_created_payload_prefers_presentment_currency() {
        let body = br#"{
            "id": 1,
            "total_price": "3.00",
            "currency": "USD",
            "presentment_currency": "EUR"
        }"#;

        let order = OrderCreatedPayload::from_slice(body)
            .unwrap()
            .into_new_order(&shop())
            .unwrap();

        assert_eq!(order.total_price, "3.00 EUR");
    }

    #[test]
    fn test_created_payload_keeps_large_ids_exact() {
        let body = br#"{"id": 5911031627905, "total_price": "1.00", "currency": "USD"}"#;

        let order = OrderCreatedPayload::from_slice(body)
            .unwrap()
            .into_new_order(&shop())
            .unwrap();

        assert_eq!(order.shopify_order_id.as_str(), "5911031627905");
    }

    #[test]
    fn test_created_payload_missing_fields_fail_closed() {
        let cases: [(&[u8], &str); 4] = [
            (br#"{"total_price": "1.00", "currency": "USD"}"#, "id"),
            (br#"{"id": "  ", "total_price": "1.00", "currency": "USD"}"#, "id"),
            (br#"{"id": 1, "currency": "USD"}"#, "total_price"),
            (br#"{"id": 1, "total_price": "1.00"}"#, "presentment_currency_code"),
        ];

        for (body, field) in cases {
            let err = OrderCreatedPayload::from_slice(body)
                .unwrap()
                .into_new_order(&shop())
                .unwrap_err();
            assert_eq!(err, PayloadError::MissingField(field));
        }
    }

    #[test]
    fn test_created_payload_invalid_total() {
        let body = br#"{"id": 1, "total_price": "free", "currency": "USD"}"#;

        let err = OrderCreatedPayload::from_slice(body)
            .unwrap()
            .into_new_order(&shop())
            .unwrap_err();

        assert!(matches!(
            err,
            PayloadError::InvalidField {
                field: "total_price",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            OrderCreatedPayload::from_slice(b"not json"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            OrderCancelledPayload::from_slice(br#""just a string""#),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn test_cancelled_payload_id() {
        let payload = OrderCancelledPayload::from_slice(br#"{"id": 123}"#).unwrap();
        assert_eq!(payload.order_id().unwrap().as_str(), "123");

        let payload = OrderCancelledPayload::from_slice(br"{}").unwrap();
        assert!(payload.order_id().is_none());

        let payload = OrderCancelledPayload::from_slice(br#"{"id": null}"#).unwrap();
        assert!(payload.order_id().is_none());
    }
}
