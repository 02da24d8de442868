//! Core types for order sync.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod order;
pub mod price;
pub mod shop;
pub mod topic;

pub use order::{
    NewOrder, OrderId, OrderRecord, ShopifyOrderId, UNKNOWN_CUSTOMER, customer_display_name,
};
pub use price::{CurrencyCode, Price, PriceError};
pub use shop::{ShopDomain, ShopDomainError};
pub use topic::{TopicError, WebhookTopic};
