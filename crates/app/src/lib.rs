//! Order Sync app library.
//!
//! Receives Shopify order webhooks, keeps a per-shop copy of the orders in
//! `PostgreSQL`, and serves the signed-in merchant a list of their orders.
//! The binary in `main.rs` is the composition root; everything else lives
//! here so integration tests can build the same router against in-memory
//! stores.
//!
//! # Security
//!
//! - Webhook bodies are accepted only with a valid `X-Shopify-Hmac-Sha256`
//! - Merchant pages require a session created by the OAuth install flow
//! - Every store call is scoped by the shop taken from one of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use middleware::create_session_layer;
use state::AppState;

/// Build the full HTTP application around a session store.
///
/// Sentry layers are left to the caller so tests run without a client.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config().is_secure());

    routes::routes()
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
