//! Transport - the boundary to the remote event hub
//!
//! The manager never talks to the network directly. It goes through the
//! traits in this module, which a broker SDK binding implements.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 PublishManager (one per hub)                 │
//! │  - owns at most one ProducerClient                          │
//! │  - publish() / publish_event() / check_health() / close()   │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          ClientFactory + ProducerClient + EventBatch          │
//! │  create(destination, credential)                            │
//! │  properties() / create_batch() / send_batch() / close()     │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                    │
//!          ▼                                    ▼
//! ┌─────────────────┐              ┌─────────────────────────────┐
//! │  InMemoryHub    │              │  Event Hubs / Kafka binding │
//! │  (included)     │              │        (external)           │
//! └─────────────────┘              └─────────────────────────────┘
//! ```

mod client;
mod credential;
mod in_memory;

pub use client::{ClientFactory, EventBatch, HubProperties, ProducerClient, TransportError};
pub use credential::Credential;
pub use in_memory::{
    Fault, InMemoryBatch, InMemoryHub, InMemoryProducer, SentEvent, DEFAULT_MAX_BATCH_BYTES,
};
