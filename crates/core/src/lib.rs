//! Order Sync Core - Shared types library.
//!
//! This crate provides the domain types shared by the order-sync components:
//! - `app` - Webhook ingestion and the embedded order list
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Shop domains, order records, prices, and webhook topics
//! - [`payload`] - Typed webhook payloads with fail-closed validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod payload;
pub mod types;

pub use payload::{CustomerPayload, OrderCancelledPayload, OrderCreatedPayload, PayloadError};
pub use types::*;
