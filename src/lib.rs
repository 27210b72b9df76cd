mod auto_publish;
mod config;
mod error;
mod event;
mod manager;

pub mod transport;

#[cfg(feature = "http")]
pub mod server;

pub use auto_publish::{auto_event, AutoPublishSettings, AutoPublishStats, AutoPublisher};
pub use config::{ConfigError, PublisherConfig, ServerConfig, DEFAULT_MAX_MESSAGES};
pub use error::{CloseError, ConnectionError};
pub use event::{Destination, EventEnvelope, PublishOptions};
pub use manager::{
    CloseMode, ConnectionStatus, HealthSnapshot, PublishManager, PublishOutcome, RejectReason,
};
