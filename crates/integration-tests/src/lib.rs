//! Integration tests for Order Sync.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p order-sync-integration-tests
//! ```
//!
//! No database or Shopify account is needed: [`TestContext`] serves the real
//! router on an ephemeral port with in-memory stores, and answers the OAuth
//! token exchange from a local stub.
//!
//! # Test Categories
//!
//! - `webhooks` - Signed deliveries and their acknowledgements
//! - `orders_page` - Sign-in, shop scoping and rendering of the order list
//! - `health` - Liveness and readiness probes

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Form, Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use reqwest::{Client, Response, redirect};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;

use order_sync::config::{AppConfig, LogFormat, ShopifyAppConfig};
use order_sync::db::memory::{MemoryInstallationStore, MemoryOrderStore};
use order_sync::shopify::{ShopifyAuth, signature};
use order_sync::state::AppState;

/// App client secret used to sign webhooks and OAuth redirects.
pub const API_SECRET: &str = "integration-test-secret";

/// Authorization code the stub token endpoint accepts.
pub const GOOD_CODE: &str = "good-code";

/// A running app plus a cookie-keeping client.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub orders: Arc<MemoryOrderStore>,
    pub installations: Arc<MemoryInstallationStore>,
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    code: String,
}

async fn stub_token_endpoint(Form(request): Form<TokenRequest>) -> impl IntoResponse {
    if request.code == GOOD_CODE {
        (
            StatusCode::OK,
            Json(json!({ "access_token": "shpat_test_token", "scope": "read_orders" })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_request" })),
        )
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

impl TestContext {
    /// Start the app and the token stub.
    pub async fn new() -> Self {
        let token_addr = serve(
            Router::new().route("/admin/oauth/access_token", post(stub_token_endpoint)),
        )
        .await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = AppConfig {
            database_url: SecretString::from("postgres://unused"),
            host: addr.ip(),
            port: addr.port(),
            app_url: base_url.clone(),
            shopify: ShopifyAppConfig {
                api_key: "integration-client".to_string(),
                api_secret: SecretString::from(API_SECRET),
                scopes: vec!["read_orders".to_string()],
            },
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
            tls: None,
        };

        let shopify = ShopifyAuth::with_token_url(
            &config.shopify,
            format!("http://{token_addr}/admin/oauth/access_token"),
        )
        .unwrap();

        let orders = Arc::new(MemoryOrderStore::new());
        let installations = Arc::new(MemoryInstallationStore::new());
        let state = AppState::new(config, orders.clone(), installations.clone(), shopify);

        let app = order_sync::app(state, MemoryStore::default());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url,
            orders,
            installations,
        }
    }

    /// Absolute URL for a path on the app.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a correctly signed webhook delivery.
    pub async fn send_webhook(&self, topic: &str, shop: &str, payload: &Value) -> Response {
        let body = serde_json::to_vec(payload).unwrap();
        let hmac = signature::sign_webhook_body(API_SECRET.as_bytes(), &body).unwrap();
        self.send_raw_webhook(topic, shop, body, &hmac).await
    }

    /// POST a webhook delivery with an explicit signature header.
    pub async fn send_raw_webhook(
        &self,
        topic: &str,
        shop: &str,
        body: Vec<u8>,
        hmac: &str,
    ) -> Response {
        self.client
            .post(self.url("/webhooks"))
            .header("Content-Type", "application/json")
            .header("X-Shopify-Hmac-Sha256", hmac)
            .header("X-Shopify-Topic", topic)
            .header("X-Shopify-Shop-Domain", shop)
            .header("X-Shopify-Webhook-Id", "b54557e4-bdd9-4b37-8a5f-bf7d70bcd043")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Run the OAuth install for `shop` with the given code and return the
    /// callback response.
    pub async fn complete_oauth(&self, shop: &str, code: &str) -> Response {
        let mut begin_url = url::Url::parse(&self.url("/auth")).unwrap();
        begin_url.query_pairs_mut().append_pair("shop", shop);

        let begin = self
            .client
            .get(begin_url)
            .send()
            .await
            .unwrap();
        assert!(begin.status().is_redirection());

        let location = begin.headers()["location"].to_str().unwrap();
        let authorize = url::Url::parse(location).unwrap();
        let state = authorize
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let mut params = vec![
            ("code".to_string(), code.to_string()),
            ("shop".to_string(), shop.to_string()),
            ("state".to_string(), state),
            ("timestamp".to_string(), "1700000000".to_string()),
        ];
        let hmac = signature::sign_query(API_SECRET.as_bytes(), &params).unwrap();
        params.push(("hmac".to_string(), hmac));

        let mut callback_url = url::Url::parse(&self.url("/auth/callback")).unwrap();
        callback_url.query_pairs_mut().extend_pairs(&params);

        self.client
            .get(callback_url)
            .send()
            .await
            .unwrap()
    }

    /// Sign the client in as `shop`.
    pub async fn sign_in(&self, shop: &str) {
        let response = self.complete_oauth(shop, GOOD_CODE).await;
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], "/app");
    }

    /// GET a page and return its status and body.
    pub async fn get_page(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }
}

/// An order-created payload.
pub fn order_created(id: u64, first: &str, last: &str, total: &str, currency: &str) -> Value {
    json!({
        "id": id,
        "customer": { "first_name": first, "last_name": last },
        "total_price": total,
        "presentment_currency_code": currency,
    })
}
