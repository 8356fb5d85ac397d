//! Importer side: zxdg_importer_v1 registries, zxdg_imported_v1 objects and
//! the child links declared through them

use super::{verify_is_toplevel, Release, XdgForeign};
use crate::error::{ForeignError, ForeignResult};
use crate::protocol::*;
use crate::signal::{SurfaceEvent, SurfaceListener, Subscription};
use crate::surface::SurfaceHost;
use std::collections::BTreeMap;

/// A bound importer: every foreign reference one client holds through it
#[derive(Debug)]
pub struct Importer {
    pub(super) client: ClientId,
    pub(super) version: u32,
    pub(super) imports: BTreeMap<ImportId, Imported>,
}

impl Importer {
    pub(super) fn new(client: ClientId, version: u32) -> Self {
        Importer {
            client,
            version,
            imports: BTreeMap::new(),
        }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportId> + '_ {
        self.imports.keys().copied()
    }
}

/// An imported foreign toplevel
#[derive(Debug)]
pub struct Imported {
    pub(super) client: ClientId,

    /// Inherited from the importer it was created through
    pub(super) version: u32,

    /// `None` once the export is gone, or if the handle never resolved
    pub(super) exported: Option<ExportId>,

    /// Local toplevels made children of the foreign one, in declaration order
    pub(super) children: Vec<ChildLink>,
}

impl Imported {
    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn exported(&self) -> Option<ExportId> {
        self.exported
    }

    pub fn is_resolved(&self) -> bool {
        self.exported.is_some()
    }

    pub fn children(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.children.iter().map(|c| c.surface)
    }
}

/// A local toplevel declared a child of an imported surface. Dropped as soon
/// as the child unmaps or gets another parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildLink {
    pub(super) surface: SurfaceId,
    pub(super) unmap: Subscription,
    pub(super) set_parent: Subscription,
}

impl ChildLink {
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }
}

impl<H: SurfaceHost> XdgForeign<H> {
    /// zxdg_importer_v1.import: always creates the imported object. If the
    /// handle does not name a live export the object is created already
    /// invalid and `destroyed` is sent right away.
    pub fn import_toplevel(&mut self, importer: ImporterId, handle: &str) -> ForeignResult<ImportId> {
        let (client, version) = self
            .importers
            .get(&importer)
            .map(|i| (i.client, i.version))
            .ok_or(ForeignError::UnknownObject(importer.into()))?;

        let live = self.resources.get_resource_counts(client).imports;
        if self.config.imports_exhausted(live) {
            log::warn!("{} reached its import limit ({})", client, live);
            return Err(ProtocolError::no_memory(importer).into());
        }

        let id = ImportId {
            importer,
            serial: self.alloc_serial(),
        };
        let exported = self.resolve(handle);
        if let Some(owner) = self.importers.get_mut(&importer) {
            owner.imports.insert(
                id,
                Imported {
                    client,
                    version,
                    exported,
                    children: Vec::new(),
                },
            );
        }
        self.resources.track(client, id.into());

        match exported {
            Some(export) => {
                if let Some(exported) = self.exported_mut(export) {
                    exported.imports.push(id);
                }
                log::debug!("{} imported {} as {}", client, export, id);
            }
            None => {
                log::debug!("{} imported unknown handle {:?}", client, handle);
                self.queue_event(client, Event::Destroyed { imported: id });
            }
        }
        Ok(id)
    }

    /// zxdg_imported_v1.set_parent_of: make a local toplevel a child of the
    /// imported surface. A no-op on an import whose registry is gone, like
    /// on an unresolved one.
    pub fn set_parent_of(&mut self, imported: ImportId, surface: SurfaceId) -> ForeignResult<()> {
        if self.inert_imports.contains_key(&imported) {
            return Ok(());
        }
        let import = self
            .imported(imported)
            .ok_or(ForeignError::UnknownObject(imported.into()))?;
        let Some(export) = import.exported else {
            return Ok(());
        };
        let already_linked = import.children.iter().any(|c| c.surface == surface);
        let Some(parent) = self.exported(export).map(|e| e.surface) else {
            return Ok(());
        };

        verify_is_toplevel(&self.host, imported.into(), surface)?;
        if self.host.is_xdg_surface(parent) != self.host.is_xdg_surface(surface) {
            return Err(ProtocolError::role_mismatch(imported).into());
        }
        if already_linked {
            return Ok(());
        }

        // Links declared earlier on this surface see the parent change
        self.reparent(surface, Some(parent));

        let unmap = self.signals.subscribe(
            surface,
            SurfaceEvent::Unmap,
            SurfaceListener::ChildUnmap(imported, surface),
        );
        let set_parent = self.signals.subscribe(
            surface,
            SurfaceEvent::SetParent,
            SurfaceListener::ChildSetParent(imported, surface),
        );
        if let Some(import) = self.imported_mut(imported) {
            import.children.push(ChildLink {
                surface,
                unmap,
                set_parent,
            });
        }
        log::debug!("{} is now a child of {} via {}", surface, parent, imported);
        Ok(())
    }

    /// zxdg_imported_v1.destroy
    pub fn destroy_imported(&mut self, id: ImportId) -> ForeignResult<()> {
        if self.remove_imported(id) {
            return Ok(());
        }
        match self.inert_imports.remove(&id) {
            Some(client) => {
                self.resources.untrack(client, id.into());
                log::debug!("Released inert {}", id);
                Ok(())
            }
            None => Err(ForeignError::UnknownObject(id.into())),
        }
    }

    fn remove_imported(&mut self, id: ImportId) -> bool {
        let Some(imported) = self
            .importers
            .get_mut(&id.importer)
            .and_then(|i| i.imports.remove(&id))
        else {
            return false;
        };
        self.finish_imported(id, imported, Release::Resource);
        true
    }

    /// Cascade for an import already taken out of its registry: children
    /// lose their parent, the export forgets us. No `destroyed` event.
    fn finish_imported(&mut self, id: ImportId, imported: Imported, release: Release) {
        for child in imported.children {
            self.drop_child(child);
        }
        if let Some(export) = imported.exported {
            if let Some(exported) = self.exported_mut(export) {
                exported.imports.retain(|i| *i != id);
            }
        }
        match release {
            Release::Resource => self.resources.untrack(imported.client, id.into()),
            Release::KeepInert => {
                self.inert_imports.insert(id, imported.client);
            }
        }
        log::debug!("Destroyed {}", id);
    }

    /// zxdg_importer_v1.destroy: disconnects every import. The client's
    /// imported objects stay inert until it destroys them.
    pub fn destroy_importer(&mut self, id: ImporterId) -> ForeignResult<()> {
        if self.remove_importer(id, Release::KeepInert) {
            Ok(())
        } else {
            Err(ForeignError::UnknownObject(id.into()))
        }
    }

    pub(super) fn remove_importer(&mut self, id: ImporterId, release: Release) -> bool {
        let Some(importer) = self.importers.remove(&id) else {
            return false;
        };
        for (import_id, imported) in importer.imports {
            self.finish_imported(import_id, imported, release);
        }
        self.resources.untrack(importer.client, id.into());
        log::debug!("Destroyed {}", id);
        true
    }

    /// Break the link between an import and its export. The import stays
    /// alive but will never resolve again.
    pub(super) fn disconnect_imported(&mut self, id: ImportId, notify: bool) {
        let Some(imported) = self.imported_mut(id) else {
            return;
        };
        let Some(export) = imported.exported.take() else {
            return;
        };
        let children = std::mem::take(&mut imported.children);
        let client = imported.client;

        if let Some(exported) = self.exported_mut(export) {
            exported.imports.retain(|i| *i != id);
        }
        for child in children {
            self.drop_child(child);
        }

        log::debug!("{} disconnected from {}", id, export);
        if notify {
            self.queue_event(client, Event::Destroyed { imported: id });
        }
    }

    /// Remove one child link without touching the child's parent
    pub(super) fn remove_child_link(&mut self, import: ImportId, surface: SurfaceId) -> Option<ChildLink> {
        let imported = self.imported_mut(import)?;
        let pos = imported.children.iter().position(|c| c.surface == surface)?;
        let link = imported.children.remove(pos);
        self.signals.cancel(link.unmap);
        self.signals.cancel(link.set_parent);
        Some(link)
    }

    /// Tear down a child link that was already detached from its import and
    /// clear the child's parent
    fn drop_child(&mut self, child: ChildLink) {
        self.signals.cancel(child.unmap);
        self.signals.cancel(child.set_parent);
        self.reparent(child.surface, None);
    }

    /// Set a toplevel's parent and let other listeners on it know
    fn reparent(&mut self, surface: SurfaceId, parent: Option<SurfaceId>) {
        self.host.set_parent(surface, parent);
        self.surface_parent_changed(surface);
    }
}
