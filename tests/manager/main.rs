//! PublishManager integration tests.

mod ceiling;
mod health;
