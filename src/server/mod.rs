//! Demonstration HTTP service over a [`PublishManager`](crate::PublishManager).
//!
//! The routes are thin callers of `publish_event`, `check_health` and
//! `close`, plus start/stop control of the [`AutoPublisher`](crate::AutoPublisher).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hub_publisher::{server, PublishManager, ServerConfig};
//! use hub_publisher::transport::{Credential, InMemoryHub};
//!
//! let config = ServerConfig::from_env()?;
//! let manager = Arc::new(PublishManager::new(InMemoryHub::new(), Credential::from_env(), config.publisher));
//! let state = Arc::new(server::AppState::new(manager, config.clone()));
//!
//! // Compose with other axum routes
//! let app = server::router(state.clone());
//!
//! // Or serve directly
//! server::serve(state, config.bind, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

mod http;
mod state;

pub use http::{router, serve, PublishRequest};
pub use state::AppState;
