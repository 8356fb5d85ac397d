//! Exporter side: zxdg_exporter_v1 registries and zxdg_exported_v1 objects

use super::{verify_is_toplevel, Release, XdgForeign};
use crate::error::{ForeignError, ForeignResult};
use crate::handle::{Handle, HandleError};
use crate::protocol::*;
use crate::signal::{SurfaceEvent, SurfaceListener, Subscription};
use crate::surface::SurfaceHost;
use std::collections::BTreeMap;

/// A bound exporter: every surface one client exported through it
#[derive(Debug)]
pub struct Exporter {
    pub(super) client: ClientId,
    pub(super) version: u32,
    pub(super) exports: BTreeMap<ExportId, Exported>,
}

impl Exporter {
    pub(super) fn new(client: ClientId, version: u32) -> Self {
        Exporter {
            client,
            version,
            exports: BTreeMap::new(),
        }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn exports(&self) -> impl Iterator<Item = ExportId> + '_ {
        self.exports.keys().copied()
    }
}

/// An exported toplevel
#[derive(Debug)]
pub struct Exported {
    pub(super) client: ClientId,

    /// Inherited from the exporter it was created through
    pub(super) version: u32,

    /// Unique among live exports, fixed at creation
    pub(super) handle: Handle,

    /// Not owned; the export destroys itself when the surface unmaps
    pub(super) surface: SurfaceId,

    /// Imports currently resolved to this export
    pub(super) imports: Vec<ImportId>,

    pub(super) unmap: Subscription,
}

impl Exported {
    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn importers(&self) -> &[ImportId] {
        &self.imports
    }
}

impl<H: SurfaceHost> XdgForeign<H> {
    /// zxdg_exporter_v1.export: export a toplevel and send its handle back
    pub fn export_toplevel(
        &mut self,
        exporter: ExporterId,
        surface: SurfaceId,
    ) -> ForeignResult<ExportId> {
        let (client, version) = self
            .exporters
            .get(&exporter)
            .map(|e| (e.client, e.version))
            .ok_or(ForeignError::UnknownObject(exporter.into()))?;

        verify_is_toplevel(&self.host, exporter.into(), surface)?;

        let live = self.resources.get_resource_counts(client).exports;
        if self.config.exports_exhausted(live) {
            log::warn!("{} reached its export limit ({})", client, live);
            return Err(ProtocolError::no_memory(exporter).into());
        }

        let handle = self.generate_handle().map_err(|err| {
            log::warn!("Cannot generate a handle for {}: {}", exporter, err);
            ForeignError::from(ProtocolError::no_memory(exporter))
        })?;

        let id = ExportId {
            exporter,
            serial: self.alloc_serial(),
        };
        let unmap = self.signals.subscribe(
            surface,
            SurfaceEvent::Unmap,
            SurfaceListener::ExportedUnmap(id),
        );
        let exported = Exported {
            client,
            version,
            handle: handle.clone(),
            surface,
            imports: Vec::new(),
            unmap,
        };
        if let Some(owner) = self.exporters.get_mut(&exporter) {
            owner.exports.insert(id, exported);
        }
        self.resources.track(client, id.into());

        log::debug!("{} exported {} as {}", client, surface, handle);
        self.queue_event(client, Event::Handle { exported: id, handle });
        Ok(id)
    }

    /// Generate a handle no live export is using
    fn generate_handle(&mut self) -> Result<Handle, HandleError> {
        let mut attempts = 0;
        loop {
            let handle = self.handles.generate()?;
            attempts += 1;
            if self.resolve(handle.as_str()).is_none() {
                return Ok(handle);
            }
            log::debug!("Handle {} already exported (attempt {})", handle, attempts);
            if self.config.handle_attempts_exhausted(attempts) {
                return Err(HandleError::TooManyCollisions(attempts));
            }
        }
    }

    /// zxdg_exported_v1.destroy. Also accepted for an export the server
    /// already destroyed, which only releases its id.
    pub fn destroy_exported(&mut self, id: ExportId) -> ForeignResult<()> {
        if self.remove_exported(id, Release::Resource) {
            return Ok(());
        }
        match self.inert_exports.remove(&id) {
            Some(client) => {
                self.resources.untrack(client, id.into());
                log::debug!("Released inert {}", id);
                Ok(())
            }
            None => Err(ForeignError::UnknownObject(id.into())),
        }
    }

    pub(super) fn remove_exported(&mut self, id: ExportId, release: Release) -> bool {
        let Some(exported) = self
            .exporters
            .get_mut(&id.exporter)
            .and_then(|e| e.exports.remove(&id))
        else {
            return false;
        };
        self.finish_exported(id, exported, release);
        true
    }

    /// Cascade for an export already taken out of its registry
    fn finish_exported(&mut self, id: ExportId, exported: Exported, release: Release) {
        for import in &exported.imports {
            self.disconnect_imported(*import, true);
        }
        self.signals.cancel(exported.unmap);
        match release {
            Release::Resource => self.resources.untrack(exported.client, id.into()),
            Release::KeepInert => {
                self.inert_exports.insert(id, exported.client);
            }
        }
        log::debug!("Destroyed {} ({})", id, exported.handle);
    }

    /// zxdg_exporter_v1.destroy: destroys every export made through it. The
    /// client's exported objects stay inert until it destroys them.
    pub fn destroy_exporter(&mut self, id: ExporterId) -> ForeignResult<()> {
        if self.remove_exporter(id, Release::KeepInert) {
            Ok(())
        } else {
            Err(ForeignError::UnknownObject(id.into()))
        }
    }

    pub(super) fn remove_exporter(&mut self, id: ExporterId, release: Release) -> bool {
        let Some(exporter) = self.exporters.remove(&id) else {
            return false;
        };
        for (export_id, exported) in exporter.exports {
            self.finish_exported(export_id, exported, release);
        }
        self.resources.untrack(exporter.client, id.into());
        log::debug!("Destroyed {}", id);
        true
    }
}
