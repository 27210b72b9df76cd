use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::auto_publish::{AutoPublishSettings, AutoPublishStats, AutoPublisher};
use crate::config::ServerConfig;
use crate::event::Destination;
use crate::manager::PublishManager;
use crate::transport::ClientFactory;

/// Shared state behind the demonstration routes.
pub struct AppState<F: ClientFactory> {
    manager: Arc<PublishManager<F>>,
    config: ServerConfig,
    event_counter: Arc<AtomicU64>,
    auto_publisher: Mutex<Option<AutoPublisher>>,
}

impl<F: ClientFactory + 'static> AppState<F> {
    pub fn new(manager: Arc<PublishManager<F>>, config: ServerConfig) -> Self {
        Self {
            manager,
            config,
            event_counter: Arc::new(AtomicU64::new(0)),
            auto_publisher: Mutex::new(None),
        }
    }

    pub fn manager(&self) -> &Arc<PublishManager<F>> {
        &self.manager
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn destination(&self) -> &Destination {
        &self.config.destination
    }

    /// Next event sequence number, shared with the auto publisher.
    pub fn next_event_number(&self) -> u64 {
        self.event_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start the auto publisher. Returns `false` if it is already running.
    pub async fn start_auto_publish(&self) -> bool {
        let mut slot = self.auto_publisher.lock().await;
        if slot.as_ref().is_some_and(AutoPublisher::is_running) {
            info!("automatic publishing is already running");
            return false;
        }

        let settings = AutoPublishSettings {
            interval: self.config.auto_publish_interval,
            stale_every: self.config.auto_publish_stale_every,
        };
        *slot = Some(AutoPublisher::spawn(
            Arc::clone(&self.manager),
            self.config.destination.clone(),
            settings,
            Arc::clone(&self.event_counter),
        ));
        true
    }

    /// Stop the auto publisher, returning its statistics if it was started.
    pub async fn stop_auto_publish(&self) -> Option<AutoPublishStats> {
        let publisher = self.auto_publisher.lock().await.take();
        match publisher {
            Some(publisher) => Some(publisher.stop().await),
            None => None,
        }
    }

    pub async fn is_auto_publishing(&self) -> bool {
        self.auto_publisher
            .lock()
            .await
            .as_ref()
            .is_some_and(AutoPublisher::is_running)
    }
}
