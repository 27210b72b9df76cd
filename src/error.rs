use std::error::Error;
use std::fmt;

use crate::event::Destination;
use crate::transport::TransportError;

/// Creating or probing a client for a destination failed.
#[derive(Debug)]
pub enum ConnectionError {
    /// The client factory refused to build a client.
    Create {
        destination: Destination,
        cause: TransportError,
    },
    /// The client was built but the reachability probe failed.
    Probe {
        destination: Destination,
        cause: TransportError,
    },
}

impl ConnectionError {
    pub fn destination(&self) -> &Destination {
        match self {
            ConnectionError::Create { destination, .. }
            | ConnectionError::Probe { destination, .. } => destination,
        }
    }

    pub fn cause(&self) -> &TransportError {
        match self {
            ConnectionError::Create { cause, .. } | ConnectionError::Probe { cause, .. } => cause,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Create { destination, cause } => {
                write!(f, "failed to create client for {}: {}", destination, cause)
            }
            ConnectionError::Probe { destination, cause } => {
                write!(f, "client for {} is unreachable: {}", destination, cause)
            }
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}

/// Releasing a client failed.
#[derive(Debug)]
pub struct CloseError {
    pub cause: TransportError,
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to close client: {}", self.cause)
    }
}

impl Error for CloseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

impl From<TransportError> for CloseError {
    fn from(cause: TransportError) -> Self {
        CloseError { cause }
    }
}
