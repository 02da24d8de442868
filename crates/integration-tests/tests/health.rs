//! Integration tests for the health probes.

use order_sync_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
async fn test_liveness() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get_page("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_readiness_with_reachable_store() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get_page("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_root_redirects_to_order_list() {
    let ctx = TestContext::new().await;

    let response = ctx.client.get(ctx.url("/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/app");
}
