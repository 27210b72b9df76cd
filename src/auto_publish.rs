//! Background task publishing synthetic events on a fixed interval.
//!
//! `AutoPublisher` keeps a destination warm and exercises recovery: every
//! `stale_every` events it closes the manager, so the next tick has to
//! reconnect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::event::{Destination, EventEnvelope};
use crate::manager::{PublishManager, RejectReason};
use crate::transport::ClientFactory;

/// Statistics from the auto publisher.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPublishStats {
    /// Number of ticks that produced an event.
    pub ticks: u64,
    /// Events confirmed sent.
    pub published: u64,
    /// Events refused by the ceiling or batch size.
    pub rejected: u64,
    /// Events that failed with a publish error.
    pub failed: u64,
    /// Forced closes to simulate a stale connection.
    pub stale_closes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPublishSettings {
    pub interval: Duration,
    /// Close the manager after every N events; 0 disables.
    pub stale_every: u64,
}

impl Default for AutoPublishSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            stale_every: 5,
        }
    }
}

/// Build the synthetic event for sequence number `n`.
pub fn auto_event(n: u64) -> EventEnvelope {
    EventEnvelope::new(json!({
        "id": format!("event-{}", n),
        "timestamp": Utc::now(),
        "type": "AUTO_EVENT",
        "message": format!("Automatic test event {}", n),
    }))
    .with_property("source", "auto-publisher")
    .with_property("eventNumber", n)
}

/// A running auto-publish task.
///
/// ## Example
///
/// ```ignore
/// let counter = Arc::new(AtomicU64::new(0));
/// let publisher = AutoPublisher::spawn(manager.clone(), destination, settings, counter);
///
/// // ... events flow every `settings.interval` ...
///
/// let stats = publisher.stop().await;
/// println!("published {} events", stats.published);
/// ```
pub struct AutoPublisher {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<AutoPublishStats>>,
}

impl AutoPublisher {
    /// Spawn the task on the current tokio runtime.
    ///
    /// `counter` numbers the events and may be shared with other publishers.
    pub fn spawn<F>(
        manager: Arc<PublishManager<F>>,
        destination: Destination,
        settings: AutoPublishSettings,
        counter: Arc<AtomicU64>,
    ) -> Self
    where
        F: ClientFactory + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        info!(interval_ms = settings.interval.as_millis() as u64, "starting automatic event publishing");

        let handle = tokio::spawn(async move {
            let mut stats = AutoPublishStats::default();
            let mut ticker = time::interval_at(time::Instant::now() + settings.interval, settings.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }

                stats.ticks += 1;
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                let outcome = manager.publish_event(auto_event(n), &destination).await;
                match outcome.reason {
                    None => stats.published += 1,
                    Some(RejectReason::PublishError) => {
                        warn!(event = n, error = ?outcome.error, "automatic event failed");
                        stats.failed += 1;
                    }
                    Some(reason) => {
                        info!(event = n, %reason, "automatic event rejected");
                        stats.rejected += 1;
                    }
                }

                if settings.stale_every > 0 && n % settings.stale_every == 0 {
                    info!(event = n, "simulating stale connection");
                    if let Err(err) = manager.close().await {
                        warn!(error = %err, "error forcing client to become stale");
                    }
                    stats.stale_closes += 1;
                }
            }

            info!(published = stats.published, "stopped automatic publishing");
            stats
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Signal the task to stop and wait for it to finish.
    /// Returns the publishing statistics.
    pub async fn stop(mut self) -> AutoPublishStats {
        self.signal_stop();
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => AutoPublishStats::default(),
        }
    }

    /// Signal the task to stop without waiting.
    pub fn signal_stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

impl Drop for AutoPublisher {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
