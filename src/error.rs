//! Error types for the foreign coordinator.

use crate::protocol::{ClientId, ObjectId, ProtocolError};
use thiserror::Error;

/// Result type alias for coordinator operations
pub type ForeignResult<T> = Result<T, ForeignError>;

/// Errors returned by coordinator operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForeignError {
    /// The client violated the protocol; its connection must be terminated
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The object was never created or has already been destroyed
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// The client is not connected to the display
    #[error("{0} is not connected")]
    NotConnected(ClientId),
}

impl ForeignError {
    /// Whether the error terminates the requesting client
    pub fn is_fatal(&self) -> bool {
        matches!(self, ForeignError::Protocol(_))
    }

    /// Protocol error to post to the client, if any
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self {
            ForeignError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}
