//! Webhook topics.

use core::fmt;

/// Error returned when a topic header is unusable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("webhook topic cannot be empty")]
pub struct TopicError;

/// The event type carried by a webhook delivery.
///
/// Shopify sends topics in the `orders/create` spelling in the
/// `X-Shopify-Topic` header; app frameworks usually expose them as
/// `ORDERS_CREATE`. Both parse to the same variant.
///
/// ```
/// use order_sync_core::WebhookTopic;
///
/// assert_eq!(WebhookTopic::parse("orders/create").unwrap(), WebhookTopic::OrdersCreate);
/// assert_eq!(WebhookTopic::parse("ORDERS_CANCELLED").unwrap(), WebhookTopic::OrdersCancelled);
/// assert_eq!(
///     WebhookTopic::parse("products/update").unwrap(),
///     WebhookTopic::Other("PRODUCTS_UPDATE".to_string()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    /// `orders/create`
    OrdersCreate,
    /// `orders/cancelled`
    OrdersCancelled,
    /// Any topic this app does not act on, in canonical form.
    Other(String),
}

impl WebhookTopic {
    /// Parse a topic header value.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the value is blank.
    pub fn parse(raw: &str) -> Result<Self, TopicError> {
        let canonical = raw.trim().replace('/', "_").to_ascii_uppercase();
        match canonical.as_str() {
            "" => Err(TopicError),
            "ORDERS_CREATE" => Ok(Self::OrdersCreate),
            "ORDERS_CANCELLED" => Ok(Self::OrdersCancelled),
            _ => Ok(Self::Other(canonical)),
        }
    }

    /// Canonical `SCREAMING_SNAKE_CASE` name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OrdersCreate => "ORDERS_CREATE",
            Self::OrdersCancelled => "ORDERS_CANCELLED",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WebhookTopic {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_spelling() {
        assert_eq!(
            WebhookTopic::parse("orders/cancelled").unwrap(),
            WebhookTopic::OrdersCancelled
        );
        assert_eq!(
            WebhookTopic::parse(" Orders/Create ").unwrap(),
            WebhookTopic::OrdersCreate
        );
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(WebhookTopic::parse(""), Err(TopicError));
        assert_eq!(WebhookTopic::parse("  "), Err(TopicError));
    }

    #[test]
    fn test_unknown_topic_is_canonicalized() {
        let topic = WebhookTopic::parse("app/uninstalled").unwrap();
        assert_eq!(topic.as_str(), "APP_UNINSTALLED");
        assert_eq!(topic.to_string(), "APP_UNINSTALLED");
    }
}
