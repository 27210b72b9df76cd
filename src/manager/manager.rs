use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::outcome::{HealthSnapshot, PublishOutcome};
use super::state::{Connection, ConnectionStatus};
use crate::config::PublisherConfig;
use crate::error::{CloseError, ConnectionError};
use crate::event::{Destination, EventEnvelope, PublishOptions};
use crate::transport::{ClientFactory, Credential, EventBatch, ProducerClient, TransportError};

/// What to do when releasing a client fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseMode {
    /// Log and continue. Used when replacing a stale client.
    Swallow,
    /// Return the failure to the caller. Used by [`PublishManager::close`].
    Propagate,
}

struct Inner<C> {
    connection: Connection<C>,
    last_error: Option<String>,
    last_client_creation: Option<DateTime<Utc>>,
    total_events_published: u64,
}

impl<C> Inner<C> {
    fn record_failure(&mut self, cause: &TransportError) {
        self.connection.mark_stale();
        self.last_error = Some(cause.to_string());
    }

    fn record_success(&mut self) {
        self.connection.mark_connected();
        self.last_error = None;
    }

    fn snapshot(&self) -> HealthSnapshot {
        let is_connected = self.connection.is_connected();
        HealthSnapshot {
            is_healthy: is_connected && self.last_error.is_none(),
            is_connected,
            last_error: self.last_error.clone(),
            total_events_published: self.total_events_published,
            last_client_creation: self.last_client_creation,
        }
    }
}

/// Owns the single client for a destination, recovers it when it goes
/// stale, and enforces a lifetime ceiling on published events.
///
/// Every operation runs inside one critical section, so client creation,
/// sends and close never interleave and the ceiling check is atomic with
/// the counter increment.
///
/// ## Example
///
/// ```
/// use hub_publisher::transport::{Credential, InMemoryHub};
/// use hub_publisher::{Destination, PublishManager, PublishOptions, PublisherConfig};
/// use serde_json::json;
///
/// # tokio_test_block(async {
/// let hub = InMemoryHub::new();
/// let manager = PublishManager::new(hub.clone(), Credential::anonymous(), PublisherConfig::new(2));
/// let orders = Destination::new("ns.servicebus.windows.net", "orders");
///
/// assert!(manager.publish(&orders, &json!({ "x": 1 }), &PublishOptions::default()).await);
/// assert_eq!(hub.len(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f);
/// # }
/// ```
pub struct PublishManager<F: ClientFactory> {
    factory: F,
    credential: Credential,
    max_messages: u64,
    inner: Mutex<Inner<F::Client>>,
}

impl<F: ClientFactory> PublishManager<F> {
    pub fn new(factory: F, credential: Credential, config: PublisherConfig) -> Self {
        Self {
            factory,
            credential,
            max_messages: config.max_messages,
            inner: Mutex::new(Inner {
                connection: Connection::Disconnected,
                last_error: None,
                last_client_creation: None,
                total_events_published: 0,
            }),
        }
    }

    pub fn max_messages(&self) -> u64 {
        self.max_messages
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub async fn total_events_published(&self) -> u64 {
        self.inner.lock().await.total_events_published
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.lock().await.connection.status()
    }

    /// Current health view without probing the remote endpoint.
    pub async fn snapshot(&self) -> HealthSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Wrap `payload` in a fresh envelope and publish it.
    ///
    /// Returns `true` only when the event was confirmed sent. Never fails:
    /// every error, including payload serialization, becomes `false`.
    pub async fn publish<T>(
        &self,
        destination: &Destination,
        payload: &T,
        options: &PublishOptions,
    ) -> bool
    where
        T: Serialize + ?Sized,
    {
        let published = self.total_events_published().await;
        if published >= self.max_messages {
            info!(
                max_messages = self.max_messages,
                "maximum message limit reached, message rejected"
            );
            return false;
        }

        let event = match EventEnvelope::encode(payload) {
            Ok(event) => event.with_options(options),
            Err(err) => {
                error!(error = %err, "failed to encode event payload");
                return false;
            }
        };

        self.publish_event(event, destination).await.success
    }

    /// Publish a prepared envelope, reporting why it was not sent.
    pub async fn publish_event(
        &self,
        event: EventEnvelope,
        destination: &Destination,
    ) -> PublishOutcome {
        let mut inner = self.inner.lock().await;

        if inner.total_events_published >= self.max_messages {
            info!(
                max_messages = self.max_messages,
                "maximum message limit reached, message rejected"
            );
            return PublishOutcome::max_messages_reached(self.max_messages);
        }

        info!(%destination, event_id = %event.id, "attempting to publish event");
        let sent = match self.ensure_connection(&mut inner, destination).await {
            Ok(client) => Self::send_event(client, &event).await,
            Err(err) => {
                error!(%destination, error = %err, "error publishing event");
                return PublishOutcome::publish_error(err.cause().to_string());
            }
        };

        match sent {
            Ok(true) => {
                inner.total_events_published += 1;
                inner.record_success();
                info!(
                    event_id = %event.id,
                    total = inner.total_events_published,
                    "successfully published event"
                );
                PublishOutcome::published()
            }
            Ok(false) => {
                error!(event_id = %event.id, "event too large to fit in a batch");
                PublishOutcome::event_too_large()
            }
            Err(cause) => {
                inner.record_failure(&cause);
                error!(%destination, error = %cause, "error publishing event");
                PublishOutcome::publish_error(cause.to_string())
            }
        }
    }

    /// Probe the connection and report a health snapshot.
    ///
    /// A held client is probed but never replaced here. With no client, one
    /// is created. Never fails; errors land in the snapshot.
    pub async fn check_health(&self, destination: &Destination) -> HealthSnapshot {
        let mut inner = self.inner.lock().await;

        let probe = match inner.connection.client() {
            Some(client) => Some(client.properties().await),
            None => None,
        };

        match probe {
            Some(Ok(_)) => inner.record_success(),
            Some(Err(cause)) => {
                warn!(%destination, error = %cause, "health probe failed");
                inner.record_failure(&cause);
            }
            None => {
                if let Err(err) = self.ensure_connection(&mut inner, destination).await {
                    warn!(%destination, error = %err, "health check could not connect");
                }
            }
        }

        inner.snapshot()
    }

    /// Release the held client. No-op when none is held.
    ///
    /// The client is dropped and the manager disconnected even when closing
    /// fails; the failure is still returned.
    pub async fn close(&self) -> Result<(), CloseError> {
        let mut inner = self.inner.lock().await;
        match inner.connection.take() {
            Some(client) => {
                info!("closing event hub client");
                Self::close_client(client, CloseMode::Propagate).await
            }
            None => Ok(()),
        }
    }

    /// Return a connected client, replacing a stale or missing one.
    async fn ensure_connection<'a>(
        &self,
        inner: &'a mut Inner<F::Client>,
        destination: &Destination,
    ) -> Result<&'a F::Client, ConnectionError> {
        if !inner.connection.is_connected() {
            if let Some(stale) = inner.connection.take() {
                let _ = Self::close_client(stale, CloseMode::Swallow).await;
            }
            let client = self.connect(inner, destination).await?;
            inner.connection = Connection::Connected(client);
        }

        match &inner.connection {
            Connection::Connected(client) => Ok(client),
            Connection::Stale(_) | Connection::Disconnected => {
                unreachable!("connection is established above")
            }
        }
    }

    /// Create a client and probe it before handing it out.
    async fn connect(
        &self,
        inner: &mut Inner<F::Client>,
        destination: &Destination,
    ) -> Result<F::Client, ConnectionError> {
        info!(%destination, "creating new event hub client");

        let client = match self.factory.create(destination, &self.credential) {
            Ok(client) => client,
            Err(cause) => {
                inner.record_failure(&cause);
                return Err(ConnectionError::Create {
                    destination: destination.clone(),
                    cause,
                });
            }
        };

        match client.properties().await {
            Ok(properties) => {
                inner.last_client_creation = Some(Utc::now());
                inner.last_error = None;
                debug!(
                    %destination,
                    partitions = properties.partition_ids.len(),
                    "event hub client connected"
                );
                Ok(client)
            }
            Err(cause) => {
                inner.record_failure(&cause);
                let _ = Self::close_client(client, CloseMode::Swallow).await;
                Err(ConnectionError::Probe {
                    destination: destination.clone(),
                    cause,
                })
            }
        }
    }

    /// Batch and send one envelope. `Ok(false)` means it does not fit.
    async fn send_event(
        client: &F::Client,
        event: &EventEnvelope,
    ) -> Result<bool, TransportError> {
        let mut batch = client.create_batch().await?;
        if !batch.try_add(event)? {
            return Ok(false);
        }
        debug!(events = batch.len(), "publishing event batch");
        client.send_batch(batch).await?;
        Ok(true)
    }

    async fn close_client(client: F::Client, mode: CloseMode) -> Result<(), CloseError> {
        match client.close().await {
            Ok(()) => Ok(()),
            Err(cause) => match mode {
                CloseMode::Swallow => {
                    warn!(error = %cause, "error closing stale client");
                    Ok(())
                }
                CloseMode::Propagate => Err(CloseError { cause }),
            },
        }
    }
}
