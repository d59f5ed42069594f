//! E2E tests for health and metrics endpoints

mod common;

use common::{TestServer, no_redirect_client};

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.expect("response body"), "OK");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/nonexistent"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_metrics_expose_auth_attempts() {
    let server = TestServer::new().await;

    no_redirect_client()
        .post(server.url("/logout"))
        .send()
        .await
        .expect("request succeeds");

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains("authgate_auth_attempts_total"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = TestServer::new().await;

    let password = "x".repeat(32 * 1024);
    let response = no_redirect_client()
        .post(server.url("/login"))
        .form(&[("identifier", "a@b.com"), ("password", password.as_str())])
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_client_error());
}
