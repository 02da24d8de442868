//! Synced order records.

use core::fmt;

use chrono::{DateTime, Utc};

use super::shop::ShopDomain;

/// Customer name stored when an order arrives without a customer.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Internal primary key of a synced order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct OrderId(i32);

impl OrderId {
    /// Create a new ID from an i32 value.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-assigned order identifier, unique within a shop.
///
/// Shopify sends numeric ids; they are kept as text so large values and the
/// `gid://` form survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct ShopifyOrderId(String);

impl ShopifyOrderId {
    /// Build an id from raw text, returning `None` when it is blank.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == raw.len() {
            Some(Self(raw))
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopifyOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the stored customer name from optional name parts.
///
/// Parts are joined with a space and trimmed. A missing customer, or one
/// whose name parts are all blank, yields [`UNKNOWN_CUSTOMER`].
///
/// ```
/// use order_sync_core::{customer_display_name, UNKNOWN_CUSTOMER};
///
/// assert_eq!(customer_display_name(Some((Some("A"), Some("B")))), "A B");
/// assert_eq!(customer_display_name(Some((None, Some("Lovelace")))), "Lovelace");
/// assert_eq!(customer_display_name(None), UNKNOWN_CUSTOMER);
/// ```
#[must_use]
pub fn customer_display_name(name_parts: Option<(Option<&str>, Option<&str>)>) -> String {
    let Some((first, last)) = name_parts else {
        return UNKNOWN_CUSTOMER.to_owned();
    };

    let joined = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let trimmed = joined.trim();

    if trimmed.is_empty() {
        UNKNOWN_CUSTOMER.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// An order to be inserted, as derived from an order-created event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Owning shop.
    pub shop: ShopDomain,
    /// Platform order id.
    pub shopify_order_id: ShopifyOrderId,
    /// Display name of the customer.
    pub customer_name: String,
    /// Formatted total, `"<amount> <currency>"`.
    pub total_price: String,
}

/// A persisted order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    /// Internal primary key.
    pub id: OrderId,
    /// Owning shop.
    pub shop: ShopDomain,
    /// Platform order id.
    pub shopify_order_id: ShopifyOrderId,
    /// Display name of the customer.
    pub customer_name: String,
    /// Formatted total, `"<amount> <currency>"`.
    pub total_price: String,
    /// Server-assigned insert time.
    pub created_at: DateTime<Utc>,
}
