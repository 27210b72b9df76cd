//! HTTP routes for the demonstration server.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health/live`: always 200, with the hub health nested under `checks`.
//! - `GET /health/ready`: 200 when healthy, 503 with the last error otherwise.
//! - `POST /publish`: publish a `TEST_EVENT`. Body `{ "message"?: string }`.
//! - `POST /simulate-stale`: close the client, wait, publish a recovery event.
//! - `POST /test-recovery`: publish, close, wait, publish three recovery events.
//! - `POST /auto-publish/start`, `POST /auto-publish/stop`: control the auto publisher.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::state::AppState;
use crate::event::EventEnvelope;
use crate::manager::{PublishOutcome, RejectReason};
use crate::transport::ClientFactory;

type SharedState<F> = State<Arc<AppState<F>>>;

/// Body of `POST /publish`.
#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Build an axum `Router` over the given state.
pub fn router<F: ClientFactory + 'static>(state: Arc<AppState<F>>) -> Router {
    Router::new()
        .route("/health/live", get(live_handler::<F>))
        .route("/health/ready", get(ready_handler::<F>))
        .route("/publish", post(publish_handler::<F>))
        .route("/simulate-stale", post(simulate_stale_handler::<F>))
        .route("/test-recovery", post(test_recovery_handler::<F>))
        .route("/auto-publish/start", post(auto_publish_start_handler::<F>))
        .route("/auto-publish/stop", post(auto_publish_stop_handler::<F>))
        .with_state(state)
}

/// Serve the routes at `addr` until `shutdown` resolves.
pub async fn serve<F, S>(
    state: Arc<AppState<F>>,
    addr: std::net::SocketAddr,
    shutdown: S,
) -> Result<(), std::io::Error>
where
    F: ClientFactory + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// `GET /health/live`
async fn live_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
) -> impl IntoResponse {
    let health = state.manager().check_health(state.destination()).await;
    Json(json!({
        "status": "UP",
        "checks": {
            "eventHub": {
                "status": if health.is_healthy { "UP" } else { "DOWN" },
                "details": health,
            }
        }
    }))
}

/// `GET /health/ready`
async fn ready_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
) -> impl IntoResponse {
    let health = state.manager().check_health(state.destination()).await;
    if health.is_healthy {
        (StatusCode::OK, Json(json!({ "status": "UP" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "DOWN", "error": health.last_error })),
        )
    }
}

/// `POST /publish`
async fn publish_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
    body: Option<Json<PublishRequest>>,
) -> impl IntoResponse {
    let n = state.next_event_number();
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let message = request
        .message
        .unwrap_or_else(|| format!("Test event {}", n));
    info!(event = n, %message, "received publish request");

    let event = EventEnvelope::new(json!({
        "id": format!("event-{}", n),
        "timestamp": Utc::now(),
        "type": "TEST_EVENT",
        "message": message,
        "counter": n,
    }))
    .with_property("source", "test-service")
    .with_property("eventNumber", n);

    let outcome = state
        .manager()
        .publish_event(event, state.destination())
        .await;
    let event_id = format!("event-{}", n);

    match outcome.reason {
        None => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "eventId": event_id,
                "message": "Event published successfully",
            })),
        ),
        Some(RejectReason::PublishError) => {
            error!(event = n, error = ?outcome.error, "error publishing event");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": outcome.error })),
            )
        }
        Some(reason) => (
            StatusCode::OK,
            Json(json!({
                "status": "rejected",
                "eventId": event_id,
                "reason": reason,
                "error": outcome.error,
            })),
        ),
    }
}

/// `POST /simulate-stale`
async fn simulate_stale_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
) -> impl IntoResponse {
    info!("simulating stale connection");
    if let Err(err) = state.manager().close().await {
        error!(error = %err, "failed to close client");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "message": err.to_string() })),
        );
    }

    tokio::time::sleep(state.config().stale_wait).await;

    let event = EventEnvelope::new(json!({
        "message": "Recovery test event",
        "timestamp": Utc::now(),
    }))
    .with_property("eventType", "recovery-test");

    let outcome = state
        .manager()
        .publish_event(event, state.destination())
        .await;
    if outcome.success {
        info!("successfully recovered from stale connection");
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Successfully recovered from stale connection",
            })),
        )
    } else {
        error!(error = ?outcome.error, "failed to recover from stale connection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": "Failed to recover from stale connection",
                "error": outcome.error,
            })),
        )
    }
}

fn recovery_result(event: u32, outcome: &PublishOutcome) -> Value {
    if outcome.success {
        json!({ "event": event, "status": "success", "timestamp": Utc::now() })
    } else {
        json!({
            "event": event,
            "status": "error",
            "error": outcome.error,
            "timestamp": Utc::now(),
        })
    }
}

/// `POST /test-recovery`
async fn test_recovery_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
) -> impl IntoResponse {
    info!("starting stale connection recovery test");
    let manager = state.manager();
    let destination = state.destination();
    let config = state.config();

    let initial = EventEnvelope::new(json!({
        "message": "Initial test event",
        "timestamp": Utc::now(),
    }))
    .with_property("eventType", "initial-test");
    let initial = manager.publish_event(initial, destination).await;

    info!("forcing client to become stale");
    if let Err(err) = manager.close().await {
        error!(error = %err, "recovery test failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": err.to_string() })),
        );
    }

    tokio::time::sleep(config.recovery_wait).await;

    let mut results = Vec::with_capacity(3);
    for i in 1..=3u32 {
        let event = EventEnvelope::new(json!({
            "message": format!("Recovery test event {}", i),
            "timestamp": Utc::now(),
            "sequence": i,
        }))
        .with_property("eventType", "recovery-test");

        info!(event = i, "attempting to publish recovery event");
        let outcome = manager.publish_event(event, destination).await;
        if outcome.success {
            info!(event = i, "published recovery event");
        } else {
            warn!(event = i, error = ?outcome.error, "failed to publish recovery event");
        }
        results.push(recovery_result(i, &outcome));

        if outcome.success {
            tokio::time::sleep(config.recovery_interval).await;
        }
    }

    let final_health = manager.check_health(destination).await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "completed",
            "initial": initial,
            "results": results,
            "finalHealth": final_health,
        })),
    )
}

/// `POST /auto-publish/start`
async fn auto_publish_start_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
) -> impl IntoResponse {
    state.start_auto_publish().await;
    Json(json!({ "status": "success", "message": "Automatic publishing started" }))
}

/// `POST /auto-publish/stop`
async fn auto_publish_stop_handler<F: ClientFactory + 'static>(
    State(state): SharedState<F>,
) -> impl IntoResponse {
    let stats = state.stop_auto_publish().await;
    Json(json!({
        "status": "success",
        "message": "Automatic publishing stopped",
        "stats": stats,
    }))
}
