//! Configuration sourced from environment variables.
//!
//! Every constructor has a `from_lookup` twin taking a closure, so tests can
//! feed values without touching the process environment.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::event::Destination;

pub const DEFAULT_MAX_MESSAGES: u64 = 30;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AUTO_PUBLISH_INTERVAL_MS: u64 = 2000;
const DEFAULT_AUTO_PUBLISH_STALE_EVERY: u64 = 5;
const DEFAULT_STALE_WAIT_MS: u64 = 2000;
const DEFAULT_RECOVERY_WAIT_MS: u64 = 5000;
const DEFAULT_RECOVERY_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} environment variable is required", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for a [`PublishManager`](crate::PublishManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Lifetime ceiling on successfully published events.
    pub max_messages: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl PublisherConfig {
    pub fn new(max_messages: u64) -> Self {
        Self { max_messages }
    }

    /// Read `MAX_MESSAGES` (default 30). Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_messages = lookup("MAX_MESSAGES")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_MESSAGES);
        Self { max_messages }
    }
}

/// Settings for the demonstration server and its auto publisher.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub destination: Destination,
    pub publisher: PublisherConfig,
    // Tick period of the auto publisher.
    pub auto_publish_interval: Duration,
    // Close the manager after every N auto events; 0 disables.
    pub auto_publish_stale_every: u64,
    // Start the auto publisher with the server.
    pub auto_publish_on_start: bool,
    // Pause between close and the recovery publish in /simulate-stale.
    pub stale_wait: Duration,
    // Pause between close and the first recovery event in /test-recovery.
    pub recovery_wait: Duration,
    // Pause between recovery events in /test-recovery.
    pub recovery_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = required(&lookup, "EVENT_HUB_NAMESPACE")?;
        let name = required(&lookup, "EVENT_HUB_NAME")?;

        let port = parsed(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let bind = SocketAddr::from(([0, 0, 0, 0], port));

        let auto_publish_interval = parsed::<u64, _>(&lookup, "AUTO_PUBLISH_INTERVAL_MS")?
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_AUTO_PUBLISH_INTERVAL_MS);
        let auto_publish_stale_every = parsed(&lookup, "AUTO_PUBLISH_STALE_EVERY")?
            .unwrap_or(DEFAULT_AUTO_PUBLISH_STALE_EVERY);
        let auto_publish_on_start = lookup("AUTO_PUBLISH_ON_START")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        Ok(Self {
            bind,
            destination: Destination::new(namespace, name),
            publisher: PublisherConfig::from_lookup(&lookup),
            auto_publish_interval: Duration::from_millis(auto_publish_interval),
            auto_publish_stale_every,
            auto_publish_on_start,
            stale_wait: Duration::from_millis(DEFAULT_STALE_WAIT_MS),
            recovery_wait: Duration::from_millis(DEFAULT_RECOVERY_WAIT_MS),
            recovery_interval: Duration::from_millis(DEFAULT_RECOVERY_INTERVAL_MS),
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
