/// xdg-foreign protocol definitions
///
/// This module describes the zxdg_exporter_v1 / zxdg_importer_v1 protocol
/// pair: object identifiers, requests, events, and errors.

pub mod types;
pub mod errors;
pub mod events;
pub mod requests;

pub use types::*;
pub use errors::*;
pub use events::*;
pub use requests::*;

/// Protocol version advertised by both globals
pub const FOREIGN_V1_VERSION: u32 = 1;

pub const EXPORTER_INTERFACE: &str = "zxdg_exporter_v1";
pub const EXPORTED_INTERFACE: &str = "zxdg_exported_v1";
pub const IMPORTER_INTERFACE: &str = "zxdg_importer_v1";
pub const IMPORTED_INTERFACE: &str = "zxdg_imported_v1";
