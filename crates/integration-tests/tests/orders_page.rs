//! Integration tests for merchant sign-in and the order list page.

use order_sync_core::ShopDomain;
use order_sync_integration_tests::{TestContext, order_created};
use reqwest::StatusCode;

use order_sync::db::InstallationStore;

const SHOP: &str = "alpha.myshopify.com";
const OTHER_SHOP: &str = "beta.myshopify.com";

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_order_list_without_session_redirects_to_login() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/app")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/auth/login");
}

#[tokio::test]
async fn test_login_page_renders_form() {
    let ctx = TestContext::new().await;

    let (status, html) = ctx.get_page("/auth/login").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("action=\"/auth\""));
    assert!(html.contains("name=\"shop\""));
}

#[tokio::test]
async fn test_oauth_install_saves_installation() {
    let ctx = TestContext::new().await;

    ctx.sign_in(SHOP).await;

    let installation = ctx
        .installations
        .find(&ShopDomain::parse(SHOP).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(installation.scopes, vec!["read_orders".to_string()]);
}

#[tokio::test]
async fn test_oauth_with_rejected_code_does_not_sign_in() {
    let ctx = TestContext::new().await;

    let response = ctx.complete_oauth(SHOP, "bad-code").await;

    assert_eq!(
        response.headers()["location"],
        "/auth/login?error=oauth_exchange_failed"
    );
    let response = ctx.client.get(ctx.url("/app")).send().await.unwrap();
    assert_eq!(response.headers()["location"], "/auth/login");
}

#[tokio::test]
async fn test_oauth_callback_with_bad_hmac_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .get(ctx.url(&format!(
            "/auth/callback?code=good-code&shop={SHOP}&state=x&timestamp=1&hmac=deadbeef"
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers()["location"],
        "/auth/login?error=oauth_invalid_hmac"
    );
}

#[tokio::test]
async fn test_logout_clears_session() {
    let ctx = TestContext::new().await;
    ctx.sign_in(SHOP).await;

    let response = ctx.client.post(ctx.url("/auth/logout")).send().await.unwrap();
    assert_eq!(response.headers()["location"], "/auth/login");

    let response = ctx.client.get(ctx.url("/app")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// =============================================================================
// Order List
// =============================================================================

#[tokio::test]
async fn test_empty_state_when_shop_has_no_orders() {
    let ctx = TestContext::new().await;
    ctx.sign_in(SHOP).await;

    let (status, html) = ctx.get_page("/app").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Synced Orders"));
    assert!(html.contains("Showing orders for alpha.myshopify.com"));
    assert!(html.contains("No orders yet"));
    assert!(html.contains("https://shopify.dev/apps/webhooks"));
}

#[tokio::test]
async fn test_list_shows_only_session_shop_newest_first() {
    let ctx = TestContext::new().await;
    for (id, name) in [(1001, "First"), (1002, "Second"), (1003, "Third")] {
        ctx.send_webhook("orders/create", SHOP, &order_created(id, name, "Buyer", "10.00", "USD"))
            .await;
    }
    ctx.send_webhook(
        "orders/create",
        OTHER_SHOP,
        &order_created(2001, "Elsewhere", "Buyer", "99.00", "EUR"),
    )
    .await;

    ctx.sign_in(SHOP).await;
    let (status, html) = ctx.get_page("/app").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!html.contains("No orders yet"));
    assert!(html.contains("Shopify Order ID"));
    assert!(html.contains("10.00 USD"));
    assert!(!html.contains("2001"));
    assert!(!html.contains("Elsewhere"));

    let third = html.find("1003").unwrap();
    let second = html.find("1002").unwrap();
    let first = html.find("1001").unwrap();
    assert!(third < second && second < first);
}

#[tokio::test]
async fn test_cancelled_order_disappears_from_list() {
    let ctx = TestContext::new().await;
    ctx.send_webhook("orders/create", SHOP, &order_created(77, "Gone", "Soon", "5.00", "USD"))
        .await;
    ctx.send_webhook("orders/cancelled", SHOP, &serde_json::json!({ "id": 77 }))
        .await;

    ctx.sign_in(SHOP).await;
    let (_, html) = ctx.get_page("/app").await;

    assert!(html.contains("No orders yet"));
    assert!(!html.contains("Gone Soon"));
}
