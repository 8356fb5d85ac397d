//! Resource tracking for foreign protocol clients
//!
//! This module tracks which exporters, exports, importers and imports each
//! client owns. The counts feed the per-client limits, and on disconnect the
//! tracker produces the cleanup requests that tear the client's registries
//! down.

use crate::protocol::*;
use std::collections::{BTreeSet, HashMap};

/// Per-client object sets
#[derive(Debug, Default, Clone)]
struct ClientResources {
    exporters: BTreeSet<ExporterId>,
    exports: BTreeSet<ExportId>,
    importers: BTreeSet<ImporterId>,
    imports: BTreeSet<ImportId>,
}

/// Tracks all foreign protocol objects allocated by clients
#[derive(Debug, Default)]
pub struct ResourceTracker {
    clients: HashMap<ClientId, ClientResources>,
}

impl ResourceTracker {
    /// Create a new resource tracker
    pub fn new() -> Self {
        ResourceTracker {
            clients: HashMap::new(),
        }
    }

    /// Track object creation
    pub fn track(&mut self, client: ClientId, object: ObjectId) {
        let resources = self.clients.entry(client).or_default();
        match object {
            ObjectId::Exporter(id) => {
                resources.exporters.insert(id);
            }
            ObjectId::Exported(id) => {
                resources.exports.insert(id);
            }
            ObjectId::Importer(id) => {
                resources.importers.insert(id);
            }
            ObjectId::Imported(id) => {
                resources.imports.insert(id);
            }
        }
    }

    /// Track object destruction
    pub fn untrack(&mut self, client: ClientId, object: ObjectId) {
        let Some(resources) = self.clients.get_mut(&client) else {
            return;
        };
        match object {
            ObjectId::Exporter(id) => {
                resources.exporters.remove(&id);
            }
            ObjectId::Exported(id) => {
                resources.exports.remove(&id);
            }
            ObjectId::Importer(id) => {
                resources.importers.remove(&id);
            }
            ObjectId::Imported(id) => {
                resources.imports.remove(&id);
            }
        }
    }

    /// Check if a client owns a specific object
    pub fn client_owns(&self, client: ClientId, object: ObjectId) -> bool {
        let Some(resources) = self.clients.get(&client) else {
            return false;
        };
        match object {
            ObjectId::Exporter(id) => resources.exporters.contains(&id),
            ObjectId::Exported(id) => resources.exports.contains(&id),
            ObjectId::Importer(id) => resources.importers.contains(&id),
            ObjectId::Imported(id) => resources.imports.contains(&id),
        }
    }

    /// Unregister a client (called on disconnect). Importers are torn down
    /// before exporters so that no import is left pointing at an export that
    /// is going away in the same pass.
    pub fn unregister_client(&mut self, client: ClientId) -> Vec<CleanupRequest> {
        let mut cleanup_requests = Vec::new();

        if let Some(resources) = self.clients.remove(&client) {
            for id in resources.importers {
                cleanup_requests.push(CleanupRequest::DestroyImporter(id));
            }
            for id in resources.exporters {
                cleanup_requests.push(CleanupRequest::DestroyExporter(id));
            }
        }

        cleanup_requests
    }

    /// Get resource counts for a client (for limits)
    pub fn get_resource_counts(&self, client: ClientId) -> ResourceCounts {
        self.clients
            .get(&client)
            .map(|r| ResourceCounts {
                exporters: r.exporters.len(),
                exports: r.exports.len(),
                importers: r.importers.len(),
                imports: r.imports.len(),
            })
            .unwrap_or_default()
    }
}

/// Resource counts for a client
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCounts {
    pub exporters: usize,
    pub exports: usize,
    pub importers: usize,
    pub imports: usize,
}

/// Registry teardown to run when a client disconnects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupRequest {
    DestroyImporter(ImporterId),
    DestroyExporter(ExporterId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_tracking() {
        let mut tracker = ResourceTracker::new();
        let client = ClientId::new(1);
        let exporter = ExporterId(1);
        let export = ExportId {
            exporter,
            serial: 2,
        };

        tracker.track(client, exporter.into());
        tracker.track(client, export.into());

        assert!(tracker.client_owns(client, export.into()));
        assert!(!tracker.client_owns(ClientId::new(2), export.into()));
        assert_eq!(tracker.get_resource_counts(client).exports, 1);

        tracker.untrack(client, export.into());
        assert_eq!(tracker.get_resource_counts(client).exports, 0);
    }

    #[test]
    fn test_cleanup_generation() {
        let mut tracker = ResourceTracker::new();
        let client = ClientId::new(1);

        tracker.track(client, ExporterId(1).into());
        tracker.track(client, ImporterId(2).into());
        tracker.track(
            client,
            ImportId {
                importer: ImporterId(2),
                serial: 3,
            }
            .into(),
        );

        let cleanup = tracker.unregister_client(client);

        assert_eq!(
            cleanup,
            vec![
                CleanupRequest::DestroyImporter(ImporterId(2)),
                CleanupRequest::DestroyExporter(ExporterId(1)),
            ]
        );
        assert!(tracker.unregister_client(client).is_empty());
        assert_eq!(tracker.get_resource_counts(client), ResourceCounts::default());
    }
}
