//! Health snapshots.

use hub_publisher::transport::{Fault, InMemoryHub};
use hub_publisher::ConnectionStatus;
use serde_json::json;

use crate::support::{manager_with, orders, publish};

// ============================================================================
// Test 1: Health check without a client creates one
// ============================================================================

#[tokio::test]
async fn health_check_connects_when_idle() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 30);

    let health = manager.check_health(&orders()).await;

    assert_eq!(hub.clients_created(), 1);
    assert!(health.is_healthy);
    assert!(health.is_connected);
    assert!(health.last_error.is_none());
    assert!(health.last_client_creation.is_some());
    assert_eq!(health.total_events_published, 0);

    // The client made by the health check is reused by the next publish.
    assert!(publish(&manager, json!(1)).await);
    assert_eq!(hub.clients_created(), 1);
}

// ============================================================================
// Test 2: A failed probe keeps the client; publish replaces it later
// ============================================================================

#[tokio::test]
async fn failed_probe_does_not_drop_client() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 30);
    assert!(publish(&manager, json!(1)).await);

    hub.fail_probe(Fault::Network("probe timed out".into()));
    let health = manager.check_health(&orders()).await;
    assert!(!health.is_healthy);
    assert!(!health.is_connected);
    assert_eq!(health.last_error.as_deref(), Some("Network error: probe timed out"));

    assert_eq!(manager.status().await, ConnectionStatus::Stale);
    assert_eq!(hub.clients_closed(), 0);
    assert_eq!(hub.clients_created(), 1);

    // Repeated health checks keep probing the same client.
    manager.check_health(&orders()).await;
    assert_eq!(hub.clients_created(), 1);

    hub.heal();
    assert!(publish(&manager, json!(2)).await);
    assert_eq!(hub.clients_created(), 2);
    assert_eq!(hub.clients_closed(), 1);
}

// ============================================================================
// Test 3: Health check that cannot connect is folded into the snapshot
// ============================================================================

#[tokio::test]
async fn health_check_swallows_connect_failure() {
    let hub = InMemoryHub::new();
    hub.fail_create(Fault::NotFound("namespace orders-ns".into()));
    let manager = manager_with(&hub, 30);

    let health = manager.check_health(&orders()).await;
    assert!(!health.is_healthy);
    assert!(!health.is_connected);
    assert_eq!(health.last_error.as_deref(), Some("Not found: namespace orders-ns"));
    assert!(health.last_client_creation.is_none());
}

// ============================================================================
// Test 4: Snapshot serializes with the documented field names
// ============================================================================

#[tokio::test]
async fn snapshot_json_shape() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 30);
    assert!(publish(&manager, json!(1)).await);

    let health = manager.check_health(&orders()).await;
    let value = serde_json::to_value(&health).unwrap();

    assert_eq!(value["isHealthy"], true);
    assert_eq!(value["isConnected"], true);
    assert!(value["lastError"].is_null());
    assert_eq!(value["totalEventsPublished"], 1);
    assert!(value["lastClientCreation"].is_string());
}

// ============================================================================
// Test 5: Close keeps the creation timestamp and counter
// ============================================================================

#[tokio::test]
async fn close_reports_disconnected() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 30);
    assert!(publish(&manager, json!(1)).await);
    let created_at = manager.snapshot().await.last_client_creation;

    manager.close().await.unwrap();
    let snapshot = manager.snapshot().await;
    assert!(!snapshot.is_connected);
    assert!(!snapshot.is_healthy);
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.total_events_published, 1);
    assert_eq!(snapshot.last_client_creation, created_at);
}
