//! Core transport traits standing in for the broker SDK.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::credential::Credential;
use crate::event::{Destination, EventEnvelope};

/// Error type for remote transport operations.
#[derive(Debug)]
pub enum TransportError {
    /// The credential was refused by the remote endpoint
    Unauthorized(String),
    /// The namespace or event hub does not exist
    NotFound(String),
    /// Network failure talking to the endpoint
    Network(String),
    /// The client was already closed
    Closed,
    /// The endpoint rejected the request
    Rejected(String),
    /// Other error
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            TransportError::NotFound(msg) => write!(f, "Not found: {}", msg),
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Closed => write!(f, "Client is closed"),
            TransportError::Rejected(msg) => write!(f, "Request rejected: {}", msg),
            TransportError::Other(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransportError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Runtime properties of an event hub, as returned by the reachability probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubProperties {
    pub name: String,
    pub partition_ids: Vec<String>,
    pub created_on: DateTime<Utc>,
}

/// A batch container handed out by a [`ProducerClient`].
pub trait EventBatch: Send {
    /// Try to add an envelope to the batch.
    ///
    /// `Ok(false)` means the envelope does not fit. `Err` means the batch
    /// rejected the envelope for another reason.
    fn try_add(&mut self, event: &EventEnvelope) -> Result<bool, TransportError>;

    /// Number of envelopes currently in the batch.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A live connection to one event hub.
///
/// Every method is a remote call; retries and timeouts are the
/// implementation's concern.
#[async_trait]
pub trait ProducerClient: Send + Sync {
    type Batch: EventBatch;

    /// Fetch the hub properties. Used as a lightweight reachability probe.
    async fn properties(&self) -> Result<HubProperties, TransportError>;

    /// Create an empty batch bounded by the hub's size limits.
    async fn create_batch(&self) -> Result<Self::Batch, TransportError>;

    /// Send a batch to the hub.
    async fn send_batch(&self, batch: Self::Batch) -> Result<(), TransportError>;

    /// Release the connection.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Builds [`ProducerClient`]s for a destination.
///
/// Creation only instantiates the client; no network traffic happens until
/// the first call on it.
pub trait ClientFactory: Send + Sync {
    type Client: ProducerClient + 'static;

    fn create(
        &self,
        destination: &Destination,
        credential: &Credential,
    ) -> Result<Self::Client, TransportError>;
}
