/// xdg-foreign - Server-side xdg-foreign (unstable v1) protocol
///
/// This library lets one client export a toplevel under an opaque handle
/// and another client import it and parent its own toplevels to it. The
/// compositor supplies the transport and the surface implementation; this
/// crate keeps the exporter/importer object graphs consistent while either
/// side is torn down.

pub mod config;
pub mod display;
pub mod error;
pub mod foreign;
pub mod handle;
pub mod protocol;
pub mod resources;
pub mod signal;
pub mod surface;

pub use config::ForeignConfig;
pub use display::{Display, GlobalId};
pub use error::{ForeignError, ForeignResult};
pub use foreign::{ForeignHandler, XdgForeign};
pub use handle::{Handle, HandleSource, RandomHandles};
pub use protocol::{ClientId, ExportId, ExporterId, ImportId, ImporterId, ObjectId, SurfaceId};
pub use surface::{MemorySurfaces, SurfaceHost, SurfaceRole};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
