use std::mem;

/// Observable connection status of a [`PublishManager`](super::PublishManager).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No client is held.
    Disconnected,
    /// A client is held and its last operation succeeded.
    Connected,
    /// A client is held but its last operation failed; it is replaced before next use.
    Stale,
}

/// The manager's single client slot.
pub(crate) enum Connection<C> {
    Disconnected,
    Connected(C),
    Stale(C),
}

impl<C> Connection<C> {
    pub(crate) fn status(&self) -> ConnectionStatus {
        match self {
            Connection::Disconnected => ConnectionStatus::Disconnected,
            Connection::Connected(_) => ConnectionStatus::Connected,
            Connection::Stale(_) => ConnectionStatus::Stale,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        matches!(self, Connection::Connected(_))
    }

    pub(crate) fn client(&self) -> Option<&C> {
        match self {
            Connection::Connected(client) | Connection::Stale(client) => Some(client),
            Connection::Disconnected => None,
        }
    }

    /// Remove the client, leaving the slot disconnected.
    pub(crate) fn take(&mut self) -> Option<C> {
        match mem::replace(self, Connection::Disconnected) {
            Connection::Connected(client) | Connection::Stale(client) => Some(client),
            Connection::Disconnected => None,
        }
    }

    /// Connected → Stale. No-op otherwise.
    pub(crate) fn mark_stale(&mut self) {
        *self = match mem::replace(self, Connection::Disconnected) {
            Connection::Connected(client) | Connection::Stale(client) => Connection::Stale(client),
            Connection::Disconnected => Connection::Disconnected,
        };
    }

    /// Stale → Connected. No-op otherwise.
    pub(crate) fn mark_connected(&mut self) {
        *self = match mem::replace(self, Connection::Disconnected) {
            Connection::Connected(client) | Connection::Stale(client) => {
                Connection::Connected(client)
            }
            Connection::Disconnected => Connection::Disconnected,
        };
    }
}
