//! Coordinator configuration
//!
//! Limits and protocol settings applied by the foreign coordinator to every
//! client that binds the exporter or importer global.

use crate::protocol::FOREIGN_V1_VERSION;

/// Foreign protocol policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignConfig {
    /// Version advertised by both globals
    pub version: u32,

    /// Handle generation attempts before giving up on collisions (0 = unlimited)
    pub max_handle_attempts: u32,

    /// Maximum live exports per client (0 = unlimited)
    pub max_exports_per_client: usize,

    /// Maximum live imports per client (0 = unlimited)
    pub max_imports_per_client: usize,
}

impl Default for ForeignConfig {
    fn default() -> Self {
        ForeignConfig {
            version: FOREIGN_V1_VERSION,
            max_handle_attempts: 16,
            max_exports_per_client: 1000,
            max_imports_per_client: 1000,
        }
    }
}

impl ForeignConfig {
    /// No limits at all (for testing)
    pub fn permissive() -> Self {
        ForeignConfig {
            version: FOREIGN_V1_VERSION,
            max_handle_attempts: 0,
            max_exports_per_client: 0,
            max_imports_per_client: 0,
        }
    }

    /// Tight per-client limits
    pub fn strict() -> Self {
        ForeignConfig {
            version: FOREIGN_V1_VERSION,
            max_handle_attempts: 4,
            max_exports_per_client: 100,
            max_imports_per_client: 100,
        }
    }

    /// Version actually advertised, clamped to what we implement
    pub fn advertised_version(&self) -> u32 {
        self.version.clamp(1, FOREIGN_V1_VERSION)
    }

    pub(crate) fn exports_exhausted(&self, live: usize) -> bool {
        self.max_exports_per_client != 0 && live >= self.max_exports_per_client
    }

    pub(crate) fn imports_exhausted(&self, live: usize) -> bool {
        self.max_imports_per_client != 0 && live >= self.max_imports_per_client
    }

    pub(crate) fn handle_attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_handle_attempts != 0 && attempts >= self.max_handle_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_clamped() {
        let config = ForeignConfig {
            version: 7,
            ..ForeignConfig::default()
        };
        assert_eq!(config.advertised_version(), 1);

        let config = ForeignConfig {
            version: 0,
            ..ForeignConfig::default()
        };
        assert_eq!(config.advertised_version(), 1);
    }

    #[test]
    fn test_zero_means_unlimited() {
        let config = ForeignConfig::permissive();
        assert!(!config.exports_exhausted(usize::MAX - 1));
        assert!(!config.handle_attempts_exhausted(u32::MAX));

        let config = ForeignConfig::strict();
        assert!(config.exports_exhausted(100));
        assert!(!config.imports_exhausted(99));
        assert!(config.handle_attempts_exhausted(4));
    }
}
