//! In-memory event hub for testing and single-process scenarios.
//!
//! `InMemoryHub` implements [`ClientFactory`] and records every envelope
//! its clients send, which makes it useful for:
//! - Unit and integration testing without a real namespace
//! - The demonstration server
//! - Exercising recovery paths through fault injection

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::client::{ClientFactory, EventBatch, HubProperties, ProducerClient, TransportError};
use super::credential::Credential;
use crate::event::{Destination, EventEnvelope};

/// Default maximum batch size, matching the 1 MiB limit of premium hubs.
pub const DEFAULT_MAX_BATCH_BYTES: usize = 1024 * 1024;

const DEFAULT_PARTITION_COUNT: usize = 4;

/// A failure to inject into one kind of remote operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    Unauthorized(String),
    NotFound(String),
    Network(String),
    Rejected(String),
}

impl Fault {
    fn to_error(&self) -> TransportError {
        match self {
            Fault::Unauthorized(msg) => TransportError::Unauthorized(msg.clone()),
            Fault::NotFound(msg) => TransportError::NotFound(msg.clone()),
            Fault::Network(msg) => TransportError::Network(msg.clone()),
            Fault::Rejected(msg) => TransportError::Rejected(msg.clone()),
        }
    }
}

#[derive(Default)]
struct Faults {
    create: Option<Fault>,
    probe: Option<Fault>,
    add: Option<Fault>,
    send: Option<Fault>,
    close: Option<Fault>,
}

/// An envelope the hub accepted, with the destination it was sent to.
#[derive(Clone, Debug, PartialEq)]
pub struct SentEvent {
    pub destination: Destination,
    pub event: EventEnvelope,
}

struct HubState {
    log: RwLock<Vec<SentEvent>>,
    faults: Mutex<Faults>,
    max_batch_bytes: AtomicUsize,
    partition_count: usize,
    created_on: DateTime<Utc>,
    clients_created: AtomicUsize,
    clients_closed: AtomicUsize,
}

/// In-memory event hub.
///
/// Cloning shares the same log, counters and faults, so a test can keep one
/// clone for assertions while the manager owns another.
///
/// ## Example
///
/// ```
/// use hub_publisher::transport::{Fault, InMemoryHub};
///
/// let hub = InMemoryHub::new();
/// hub.fail_probe(Fault::Network("connection refused".into()));
/// assert_eq!(hub.clients_created(), 0);
/// hub.heal();
/// ```
#[derive(Clone)]
pub struct InMemoryHub {
    state: Arc<HubState>,
}

impl Default for InMemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHub {
    /// Create a new hub with default limits and no faults.
    pub fn new() -> Self {
        Self {
            state: Arc::new(HubState {
                log: RwLock::new(Vec::new()),
                faults: Mutex::new(Faults::default()),
                max_batch_bytes: AtomicUsize::new(DEFAULT_MAX_BATCH_BYTES),
                partition_count: DEFAULT_PARTITION_COUNT,
                created_on: Utc::now(),
                clients_created: AtomicUsize::new(0),
                clients_closed: AtomicUsize::new(0),
            }),
        }
    }

    /// Set the maximum encoded size of a batch.
    pub fn with_max_batch_bytes(self, max: usize) -> Self {
        self.state.max_batch_bytes.store(max, Ordering::SeqCst);
        self
    }

    pub fn fail_create(&self, fault: Fault) {
        self.faults().create = Some(fault);
    }

    pub fn fail_probe(&self, fault: Fault) {
        self.faults().probe = Some(fault);
    }

    pub fn fail_add(&self, fault: Fault) {
        self.faults().add = Some(fault);
    }

    pub fn fail_send(&self, fault: Fault) {
        self.faults().send = Some(fault);
    }

    pub fn fail_close(&self, fault: Fault) {
        self.faults().close = Some(fault);
    }

    /// Clear every injected fault.
    pub fn heal(&self) {
        *self.faults() = Faults::default();
    }

    /// Number of clients handed out by [`ClientFactory::create`].
    pub fn clients_created(&self) -> usize {
        self.state.clients_created.load(Ordering::SeqCst)
    }

    /// Number of clients closed successfully.
    pub fn clients_closed(&self) -> usize {
        self.state.clients_closed.load(Ordering::SeqCst)
    }

    /// Clients created but not yet closed.
    pub fn open_clients(&self) -> usize {
        self.clients_created() - self.clients_closed()
    }

    /// All envelopes accepted so far, in send order.
    pub fn events(&self) -> Vec<SentEvent> {
        self.log().clone()
    }

    /// Envelopes accepted for one destination.
    pub fn events_for(&self, destination: &Destination) -> Vec<EventEnvelope> {
        self.log()
            .iter()
            .filter(|sent| &sent.destination == destination)
            .map(|sent| sent.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    /// Clear the log (useful for test cleanup). Counters and faults are kept.
    pub fn clear(&self) {
        self.state
            .log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.state
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self) -> std::sync::RwLockReadGuard<'_, Vec<SentEvent>> {
        self.state.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn fault_for(&self, pick: fn(&Faults) -> &Option<Fault>) -> Option<TransportError> {
        pick(&self.faults()).as_ref().map(Fault::to_error)
    }
}

impl ClientFactory for InMemoryHub {
    type Client = InMemoryProducer;

    fn create(
        &self,
        destination: &Destination,
        _credential: &Credential,
    ) -> Result<InMemoryProducer, TransportError> {
        if let Some(err) = self.fault_for(|f| &f.create) {
            return Err(err);
        }
        self.state.clients_created.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryProducer {
            hub: self.clone(),
            destination: destination.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

/// A client bound to one destination of an [`InMemoryHub`].
pub struct InMemoryProducer {
    hub: InMemoryHub,
    destination: Destination,
    closed: AtomicBool,
}

impl InMemoryProducer {
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.is_closed() {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProducerClient for InMemoryProducer {
    type Batch = InMemoryBatch;

    async fn properties(&self) -> Result<HubProperties, TransportError> {
        self.check_open()?;
        if let Some(err) = self.hub.fault_for(|f| &f.probe) {
            return Err(err);
        }
        Ok(HubProperties {
            name: self.destination.name.clone(),
            partition_ids: (0..self.hub.state.partition_count)
                .map(|p| p.to_string())
                .collect(),
            created_on: self.hub.state.created_on,
        })
    }

    async fn create_batch(&self) -> Result<InMemoryBatch, TransportError> {
        self.check_open()?;
        Ok(InMemoryBatch {
            max_bytes: self.hub.state.max_batch_bytes.load(Ordering::SeqCst),
            used_bytes: 0,
            events: Vec::new(),
            add_fault: self.hub.faults().add.clone(),
        })
    }

    async fn send_batch(&self, batch: InMemoryBatch) -> Result<(), TransportError> {
        self.check_open()?;
        if let Some(err) = self.hub.fault_for(|f| &f.send) {
            return Err(err);
        }
        let mut log = self
            .hub
            .state
            .log
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        log.extend(batch.events.into_iter().map(|event| SentEvent {
            destination: self.destination.clone(),
            event,
        }));
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if let Some(err) = self.hub.fault_for(|f| &f.close) {
            return Err(err);
        }
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.hub.state.clients_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Batch produced by [`InMemoryProducer::create_batch`].
pub struct InMemoryBatch {
    max_bytes: usize,
    used_bytes: usize,
    events: Vec<EventEnvelope>,
    add_fault: Option<Fault>,
}

impl EventBatch for InMemoryBatch {
    fn try_add(&mut self, event: &EventEnvelope) -> Result<bool, TransportError> {
        if let Some(fault) = &self.add_fault {
            return Err(fault.to_error());
        }
        let size = event.encoded_len();
        if self.used_bytes.saturating_add(size) > self.max_bytes {
            return Ok(false);
        }
        self.used_bytes += size;
        self.events.push(event.clone());
        Ok(true)
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}
