//! Destinations and the event envelope sent to the hub.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The remote event hub events are sent to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Event hub name
    pub name: String,
    /// Namespace host, e.g. `my-ns.servicebus.windows.net`
    pub fully_qualified_namespace: String,
}

impl Destination {
    pub fn new(fully_qualified_namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fully_qualified_namespace: fully_qualified_namespace.into(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.fully_qualified_namespace, self.name)
    }
}

/// Per-call publish options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOptions {
    /// Routing key; events sharing a key land on the same partition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
}

impl PublishOptions {
    pub fn with_partition_key(key: impl Into<String>) -> Self {
        Self {
            partition_key: Some(key.into()),
        }
    }
}

/// An event to be sent to the hub.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Unique identifier for this event
    pub id: String,
    /// When the envelope was built
    pub timestamp: DateTime<Utc>,
    /// Application payload
    pub body: Value,
    /// Optional routing key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    /// Application properties (source, sequence numbers, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl EventEnvelope {
    /// Wrap a payload with a fresh id and the current time.
    pub fn new(body: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            body,
            partition_key: None,
            properties: BTreeMap::new(),
        }
    }

    /// Serialize `payload` to JSON and wrap it.
    pub fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(payload)?))
    }

    pub fn with_partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    /// Add an application property to the envelope.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Apply per-call publish options.
    pub fn with_options(mut self, options: &PublishOptions) -> Self {
        if let Some(key) = &options.partition_key {
            self.partition_key = Some(key.clone());
        }
        self
    }

    /// Size of the JSON-encoded envelope in bytes.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(usize::MAX)
    }
}
