//! xdg-foreign event definitions
//!
//! Events are queued by the coordinator and drained by the transport, which
//! marshals them toward the owning client.

use super::errors::ProtocolError;
use super::types::*;
use crate::handle::Handle;

/// zxdg_exported_v1.handle
pub const EXPORTED_HANDLE: u16 = 0;
/// zxdg_imported_v1.destroyed
pub const IMPORTED_DESTROYED: u16 = 0;

/// An event toward a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The handle assigned to a freshly exported surface
    Handle { exported: ExportId, handle: Handle },

    /// The imported surface is no longer valid
    Destroyed { imported: ImportId },

    /// Fatal protocol error; the connection is terminated right after
    Error(ProtocolError),
}

impl Event {
    /// Object the event is emitted on
    pub fn object(&self) -> ObjectId {
        match self {
            Event::Handle { exported, .. } => ObjectId::Exported(*exported),
            Event::Destroyed { imported } => ObjectId::Imported(*imported),
            Event::Error(err) => err.object,
        }
    }

    /// Wire opcode within the object's interface, `None` for display errors
    pub fn opcode(&self) -> Option<u16> {
        match self {
            Event::Handle { .. } => Some(EXPORTED_HANDLE),
            Event::Destroyed { .. } => Some(IMPORTED_DESTROYED),
            Event::Error(_) => None,
        }
    }
}

/// An event addressed to a client connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub client: ClientId,
    pub event: Event,
}
