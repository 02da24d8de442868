//! Business logic behind the HTTP handlers.

pub mod webhooks;

pub use webhooks::{WebhookError, WebhookOutcome};
