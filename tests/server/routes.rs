//! Route-level behavior of the demonstration server.

use hub_publisher::transport::{Fault, InMemoryHub};
use serde_json::{json, Value};

use crate::support::{start_server, start_server_with_hub, test_config};

#[tokio::test]
async fn live_reports_hub_details() {
    let server = start_server(test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health/live", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "UP");
    assert_eq!(body["checks"]["eventHub"]["status"], "UP");
    assert_eq!(body["checks"]["eventHub"]["details"]["isConnected"], true);
    assert_eq!(server.hub.clients_created(), 1);
}

#[tokio::test]
async fn ready_is_503_when_unreachable() {
    let hub = InMemoryHub::new();
    hub.fail_probe(Fault::Network("connect ETIMEDOUT".into()));
    let server = start_server_with_hub(hub, test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health/ready", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "DOWN");
    assert_eq!(body["error"], "Network error: connect ETIMEDOUT");

    // Liveness stays 200 but reports the hub as down.
    let resp = client
        .get(format!("{}/health/live", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["checks"]["eventHub"]["status"], "DOWN");

    server.hub.heal();
    let resp = client
        .get(format!("{}/health/ready", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn publish_sends_test_event() {
    let server = start_server(test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/publish", server.base))
        .json(&json!({ "message": "hello hub" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["eventId"], "event-1");

    let sent = server.hub.events();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event.body["type"], "TEST_EVENT");
    assert_eq!(sent[0].event.body["message"], "hello hub");
    assert_eq!(sent[0].event.properties["source"], "test-service");
    assert_eq!(sent[0].destination.name, "telemetry");
}

#[tokio::test]
async fn publish_without_body_uses_default_message() {
    let server = start_server(test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/publish", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let sent = server.hub.events();
    assert_eq!(sent[0].event.body["message"], "Test event 1");
}

#[tokio::test]
async fn publish_error_is_500() {
    let hub = InMemoryHub::new();
    hub.fail_create(Fault::Unauthorized("no role assignment".into()));
    let server = start_server_with_hub(hub, test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/publish", server.base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Unauthorized: no role assignment");
}

#[tokio::test]
async fn ceiling_rejection_is_not_an_error() {
    let server = start_server(test_config(1)).await;
    let client = reqwest::Client::new();

    for expected in ["success", "rejected"] {
        let resp = client
            .post(format!("{}/publish", server.base))
            .json(&json!({ "message": "m" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], expected);
    }

    let resp = client
        .post(format!("{}/publish", server.base))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["reason"], "MAX_MESSAGES_REACHED");
    assert_eq!(server.hub.len(), 1);
}

#[tokio::test]
async fn simulate_stale_recovers() {
    let server = start_server(test_config(30)).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/publish", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(server.hub.clients_created(), 1);

    let resp = client
        .post(format!("{}/simulate-stale", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");

    assert_eq!(server.hub.clients_created(), 2);
    assert_eq!(server.hub.len(), 2);
}

#[tokio::test]
async fn test_recovery_reports_each_event() {
    let server = start_server(test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/test-recovery", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "completed");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["status"] == "success"));
    assert_eq!(body["finalHealth"]["isHealthy"], true);
    assert_eq!(body["finalHealth"]["totalEventsPublished"], 4);
    assert_eq!(server.hub.clients_created(), 2);
}
