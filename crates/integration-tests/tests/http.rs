//! End-to-end tests for the HTTP surface.

#![allow(clippy::unwrap_used)]

use aether_integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client.get(server.http_url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client
        .get(server.http_url("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_inventory_tracks_websocket_purchases() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let before: Vec<Value> = client
        .get(server.http_url("/api/inventory"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before.len(), 4);
    assert_eq!(before[3]["stock"], 23);

    let (mut buyer, _) = server.connect_ready().await;
    buyer
        .request("purchase", 1, json!([{"id": "4", "quantity": 3}]))
        .await;
    buyer.expect_event("inventory_update").await;
    buyer.expect_event("ack").await;

    let after: Vec<Value> = client
        .get(server.http_url("/api/inventory"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after[3]["stock"], 20);
    assert_eq!(after[..3], before[..3]);
}
