use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a publish was not sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// The lifetime ceiling was reached; no connection was attempted.
    MaxMessagesReached,
    /// The envelope does not fit in a batch; connection health is untouched.
    EventTooLarge,
    /// Connecting, batching or sending failed; the connection is marked stale.
    PublishError,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MaxMessagesReached => "MAX_MESSAGES_REACHED",
            RejectReason::EventTooLarge => "EVENT_TOO_LARGE",
            RejectReason::PublishError => "PUBLISH_ERROR",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`PublishManager::publish_event`](super::PublishManager::publish_event).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishOutcome {
    pub fn published() -> Self {
        Self {
            success: true,
            reason: None,
            error: None,
        }
    }

    pub fn rejected(reason: RejectReason, error: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            error: Some(error.into()),
        }
    }

    pub fn max_messages_reached(max_messages: u64) -> Self {
        Self::rejected(
            RejectReason::MaxMessagesReached,
            format!("Maximum message limit ({}) reached", max_messages),
        )
    }

    pub fn event_too_large() -> Self {
        Self::rejected(
            RejectReason::EventTooLarge,
            "Event too large to fit in a batch",
        )
    }

    pub fn publish_error(error: impl Into<String>) -> Self {
        Self::rejected(RejectReason::PublishError, error)
    }

    pub fn is_rejected_for(&self, reason: RejectReason) -> bool {
        self.reason == Some(reason)
    }
}

/// Point-in-time view of connection health and publish statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub is_healthy: bool,
    pub is_connected: bool,
    pub last_error: Option<String>,
    pub total_events_published: u64,
    pub last_client_creation: Option<DateTime<Utc>>,
}
