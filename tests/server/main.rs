//! Demonstration server integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

#[cfg(feature = "http")]
mod routes;
#[cfg(feature = "http")]
mod auto_publish;
