//! Lifetime message ceiling.

use hub_publisher::transport::{Fault, InMemoryHub};
use hub_publisher::{EventEnvelope, PublishOutcome, RejectReason};
use serde_json::json;

use crate::support::{manager_with, orders, publish};

// ============================================================================
// Test 1: Ceiling of two, third publish rejected
// ============================================================================

#[tokio::test]
async fn third_publish_hits_ceiling() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 2);

    assert!(publish(&manager, json!({ "x": 1 })).await);
    assert_eq!(manager.total_events_published().await, 1);

    assert!(publish(&manager, json!({ "x": 2 })).await);
    assert_eq!(manager.total_events_published().await, 2);

    let outcome = manager
        .publish_event(EventEnvelope::new(json!({ "x": 3 })), &orders())
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.reason, Some(RejectReason::MaxMessagesReached));
    assert_eq!(outcome.error.as_deref(), Some("Maximum message limit (2) reached"));
    assert_eq!(manager.total_events_published().await, 2);

    let bodies: Vec<_> = hub.events_for(&orders()).into_iter().map(|e| e.body).collect();
    assert_eq!(bodies, vec![json!({ "x": 1 }), json!({ "x": 2 })]);
}

// ============================================================================
// Test 2: At the ceiling, no client is created
// ============================================================================

#[tokio::test]
async fn ceiling_short_circuits_before_connecting() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 1);

    assert!(publish(&manager, json!("only")).await);
    manager.close().await.unwrap();
    let created = hub.clients_created();

    assert!(!publish(&manager, json!("one more")).await);
    let outcome = manager
        .publish_event(EventEnvelope::new(json!("and another")), &orders())
        .await;
    assert_eq!(outcome, PublishOutcome::max_messages_reached(1));

    assert_eq!(hub.clients_created(), created);
    assert_eq!(hub.len(), 1);
}

// ============================================================================
// Test 3: Zero ceiling never connects
// ============================================================================

#[tokio::test]
async fn zero_ceiling_rejects_everything() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 0);

    assert!(!publish(&manager, json!(1)).await);
    assert_eq!(hub.clients_created(), 0);
    assert_eq!(manager.total_events_published().await, 0);
}

// ============================================================================
// Test 4: Failed publishes do not count toward the ceiling
// ============================================================================

#[tokio::test]
async fn counter_tracks_only_successes() {
    let hub = InMemoryHub::new();
    let manager = manager_with(&hub, 3);
    let mut successes = 0u64;

    for n in 0..8 {
        if n % 2 == 1 {
            hub.fail_send(Fault::Network(format!("drop {}", n)));
        } else {
            hub.heal();
        }
        if publish(&manager, json!({ "n": n })).await {
            successes += 1;
        }
        let total = manager.total_events_published().await;
        assert_eq!(total, successes);
        assert!(total <= 3);
    }

    assert_eq!(successes, 3);
    assert_eq!(hub.len(), 3);
}

// ============================================================================
// Test 5: Oversized envelopes are not counted
// ============================================================================

#[tokio::test]
async fn oversized_envelope_is_not_counted() {
    let hub = InMemoryHub::new().with_max_batch_bytes(256);
    let manager = manager_with(&hub, 5);

    let outcome = manager
        .publish_event(EventEnvelope::new(json!("x".repeat(1024))), &orders())
        .await;
    assert_eq!(outcome, PublishOutcome::event_too_large());
    assert_eq!(manager.total_events_published().await, 0);

    assert!(publish(&manager, json!("small")).await);
    assert_eq!(manager.total_events_published().await, 1);
}
