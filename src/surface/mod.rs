/// Surface host
///
/// This module contains the trait through which the foreign protocol talks
/// to the compositor's surface and xdg-shell implementation, and an
/// in-memory host used for headless operation and tests.

mod r#trait;
pub use r#trait::*;

mod memory;
pub use memory::MemorySurfaces;
