//! Auto-publish start/stop over HTTP.

use std::time::Duration;

use serde_json::Value;

use crate::support::{start_server, test_config};

#[tokio::test]
async fn start_and_stop_auto_publishing() {
    let server = start_server(test_config(1000)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/auto-publish/start", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(server.state.is_auto_publishing().await);

    // A second start is a no-op.
    client
        .post(format!("{}/auto-publish/start", server.base))
        .send()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let resp = client
        .post(format!("{}/auto-publish/stop", server.base))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    let published = body["stats"]["published"].as_u64().unwrap();
    assert!(published >= 1);
    assert!(!server.state.is_auto_publishing().await);

    let sent = server.hub.events();
    assert_eq!(sent.len() as u64, published);
    assert_eq!(sent[0].event.body["type"], "AUTO_EVENT");
    assert_eq!(sent[0].event.properties["source"], "auto-publisher");

    // Nothing more is sent once stopped.
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(server.hub.len() as u64, published);
}

#[tokio::test]
async fn stop_without_start_is_ok() {
    let server = start_server(test_config(30)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/auto-publish/stop", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["stats"].is_null());
}

#[tokio::test]
async fn auto_events_share_the_publish_counter() {
    let server = start_server(test_config(1000)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/publish", server.base))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["eventId"], "event-1");

    assert!(server.state.start_auto_publish().await);
    tokio::time::sleep(Duration::from_millis(30)).await;
    server.state.stop_auto_publish().await;

    let auto = server
        .hub
        .events()
        .into_iter()
        .find(|sent| sent.event.body["type"] == "AUTO_EVENT")
        .unwrap();
    assert_eq!(auto.event.body["id"], "event-2");
}
