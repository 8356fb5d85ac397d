//! Exported surface handles
//!
//! A handle is the opaque token a client shares out-of-band so that another
//! client can import the exported surface. Handles are random v4 UUIDs in
//! their canonical hyphenated form. Uniqueness among live exports is checked
//! by the coordinator, not here.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Opaque exported-surface handle
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Handle(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for Handle {
    fn from(uuid: Uuid) -> Self {
        Handle(uuid.hyphenated().to_string())
    }
}

impl PartialEq<str> for Handle {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Handle generation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// The entropy source could not produce a token
    #[error("entropy source exhausted")]
    Exhausted,

    /// Every attempt collided with a live export
    #[error("no unique handle after {0} attempts")]
    TooManyCollisions(u32),
}

/// Source of fresh handles
pub trait HandleSource {
    fn generate(&mut self) -> Result<Handle, HandleError>;
}

/// Random v4 UUID handles (122 random bits)
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHandles;

impl HandleSource for RandomHandles {
    fn generate(&mut self) -> Result<Handle, HandleError> {
        Ok(Handle::from(Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_handle_format() {
        let handle = RandomHandles.generate().unwrap();
        assert_eq!(handle.as_str().len(), 36);
        let parsed = Uuid::parse_str(handle.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_random_handles_differ() {
        let mut source = RandomHandles;
        let handles: HashSet<Handle> = (0..64).map(|_| source.generate().unwrap()).collect();
        assert_eq!(handles.len(), 64);
    }
}
