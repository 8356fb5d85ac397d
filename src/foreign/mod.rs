//! xdg-foreign coordinator
//!
//! This module contains the process-wide coordinator for the
//! zxdg_exporter_v1 / zxdg_importer_v1 globals. It owns every exporter and
//! importer registry, resolves handles across all live exports, delivers
//! surface lifecycle events to the objects subscribed to them, and drives
//! teardown when a client goes away or the display shuts down.
//!
//! All cross references (export to importers, import to export, child links
//! to surfaces) are identifiers looked up in the registries, so a reference
//! to a destroyed object resolves to nothing instead of dangling. Every
//! destruction path removes the back reference on the other side in the
//! same step.
//!
//! When the server destroys an object behind the client's back (the
//! exported surface unmaps, or the owning registry is destroyed) the client
//! still holds its protocol object. Its id is kept as an inert object until
//! the client destroys it, so that the request is accepted instead of
//! looking like a reference to an unknown object.

mod export;
mod import;

pub use export::{Exported, Exporter};
pub use import::{ChildLink, Imported, Importer};

use crate::config::ForeignConfig;
use crate::display::{Display, GlobalId};
use crate::error::{ForeignError, ForeignResult};
use crate::handle::{Handle, HandleSource, RandomHandles};
use crate::protocol::*;
use crate::resources::{CleanupRequest, ResourceTracker};
use crate::signal::{ListenerId, Signal, SurfaceEvent, SurfaceListener, SurfaceSignals};
use crate::surface::{SurfaceHost, SurfaceRole};
use std::collections::{BTreeMap, VecDeque};

/// Compositor state that holds the coordinator
///
/// The coordinator registers a display destroy listener which takes itself
/// out of the compositor state through this trait and tears down.
pub trait ForeignHandler {
    type Host: SurfaceHost;

    fn xdg_foreign_state(&mut self) -> &mut Option<XdgForeign<Self::Host>>;
}

/// Listener for the coordinator's own destruction
pub type ForeignDestroyListener = Box<dyn FnOnce()>;

/// The xdg-foreign coordinator
pub struct XdgForeign<H> {
    /// The compositor's surfaces
    host: H,

    /// Limits and protocol settings
    config: ForeignConfig,

    /// Source of exported handles
    handles: Box<dyn HandleSource>,

    /// zxdg_exporter_v1 global
    exporter_global: GlobalId,

    /// zxdg_importer_v1 global
    importer_global: GlobalId,

    /// Our listener on the display's destroy signal
    display_listener: ListenerId,

    /// Bound exporters and the exports they own
    exporters: BTreeMap<ExporterId, Exporter>,

    /// Bound importers and the imports they own
    importers: BTreeMap<ImporterId, Importer>,

    /// Exports the server destroyed while the client still holds them
    inert_exports: BTreeMap<ExportId, ClientId>,

    /// Imports whose registry is gone while the client still holds them
    inert_imports: BTreeMap<ImportId, ClientId>,

    /// Unmap / set_parent subscriptions on surfaces
    signals: SurfaceSignals,

    /// Per-client object tracking
    resources: ResourceTracker,

    /// Events waiting to be sent to clients
    events: VecDeque<Outgoing>,

    /// Fired once when the coordinator is destroyed
    destroy_signal: Signal<ForeignDestroyListener>,

    /// Next object ID to allocate; never reused
    next_object_id: u64,
}

impl<H: SurfaceHost + 'static> XdgForeign<H> {
    /// Create the coordinator and advertise both globals on the display.
    /// The coordinator is torn down automatically when the display is
    /// terminated, provided it is stored where `D` can hand it back.
    pub fn new<D>(display: &mut Display<D>, host: H, config: ForeignConfig) -> Self
    where
        D: ForeignHandler<Host = H> + 'static,
    {
        let version = config.advertised_version();
        let exporter_global = display.create_global(EXPORTER_INTERFACE, version);
        let importer_global = display.create_global(IMPORTER_INTERFACE, version);

        let display_listener = display.add_destroy_listener(Box::new(|state: &mut D| {
            if let Some(foreign) = state.xdg_foreign_state().take() {
                log::info!("Display destroyed, tearing down xdg-foreign");
                foreign.teardown();
            }
        }));

        XdgForeign {
            host,
            config,
            handles: Box::new(RandomHandles),
            exporter_global,
            importer_global,
            display_listener,
            exporters: BTreeMap::new(),
            importers: BTreeMap::new(),
            inert_exports: BTreeMap::new(),
            inert_imports: BTreeMap::new(),
            signals: SurfaceSignals::new(),
            resources: ResourceTracker::new(),
            events: VecDeque::new(),
            destroy_signal: Signal::new(),
            next_object_id: 1,
        }
    }
}

impl<H: SurfaceHost> XdgForeign<H> {
    /// Replace the handle source (the default generates random UUIDs)
    pub fn with_handle_source(mut self, source: Box<dyn HandleSource>) -> Self {
        self.handles = source;
        self
    }

    /// Destroy the coordinator: withdraw both globals, tear down every
    /// registry, then fire the destroy listeners.
    pub fn destroy<D>(self, display: &mut Display<D>) {
        display.destroy_global(self.exporter_global);
        display.destroy_global(self.importer_global);
        display.remove_destroy_listener(self.display_listener);
        self.teardown();
    }

    fn teardown(mut self) {
        let importers: Vec<ImporterId> = self.importers.keys().copied().collect();
        for id in importers {
            self.remove_importer(id, Release::Resource);
        }
        let exporters: Vec<ExporterId> = self.exporters.keys().copied().collect();
        for id in exporters {
            self.remove_exporter(id, Release::Resource);
        }

        for (_, listener) in self.destroy_signal.drain() {
            listener();
        }
        log::info!("xdg-foreign destroyed");
    }

    /// Subscribe to the coordinator's destruction
    pub fn add_destroy_listener(&mut self, listener: ForeignDestroyListener) -> ListenerId {
        self.destroy_signal.add(listener)
    }

    pub fn remove_destroy_listener(&mut self, id: ListenerId) -> bool {
        self.destroy_signal.remove(id).is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ForeignConfig {
        &self.config
    }

    pub fn exporter_global(&self) -> GlobalId {
        self.exporter_global
    }

    pub fn importer_global(&self) -> GlobalId {
        self.importer_global
    }

    fn alloc_serial(&mut self) -> u64 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    fn queue_event(&mut self, client: ClientId, event: Event) {
        self.events.push_back(Outgoing { client, event });
    }

    /// Drain the events queued for clients, oldest first
    pub fn take_events(&mut self) -> Vec<Outgoing> {
        self.events.drain(..).collect()
    }

    /// Bind the exporter global for a client
    pub fn bind_exporter<D>(
        &mut self,
        display: &Display<D>,
        client: ClientId,
    ) -> ForeignResult<ExporterId> {
        if !display.is_connected(client) {
            return Err(ForeignError::NotConnected(client));
        }
        let id = ExporterId(self.alloc_serial());
        self.exporters.insert(id, Exporter::new(client, self.config.advertised_version()));
        self.resources.track(client, id.into());
        log::debug!("{} bound {}", client, id);
        Ok(id)
    }

    /// Bind the importer global for a client
    pub fn bind_importer<D>(
        &mut self,
        display: &Display<D>,
        client: ClientId,
    ) -> ForeignResult<ImporterId> {
        if !display.is_connected(client) {
            return Err(ForeignError::NotConnected(client));
        }
        let id = ImporterId(self.alloc_serial());
        self.importers.insert(id, Importer::new(client, self.config.advertised_version()));
        self.resources.track(client, id.into());
        log::debug!("{} bound {}", client, id);
        Ok(id)
    }

    /// Find the live export advertising `handle`. Scans every exporter, so
    /// it only ever sees objects that are currently registered.
    pub fn resolve(&self, handle: &str) -> Option<ExportId> {
        self.exporters.values().find_map(|exporter| {
            exporter
                .exports
                .iter()
                .find(|(_, exported)| exported.handle.as_str() == handle)
                .map(|(id, _)| *id)
        })
    }

    /// Report that a surface was unmapped (or destroyed). Exports of the
    /// surface self-destroy and child links on it are dropped.
    pub fn surface_unmapped(&mut self, surface: SurfaceId) {
        for (sub, listener) in self.signals.snapshot(surface, SurfaceEvent::Unmap) {
            // An earlier listener in this cascade may have removed it
            if !self.signals.is_live(sub) {
                continue;
            }
            match listener {
                SurfaceListener::ExportedUnmap(id) => {
                    log::debug!("{} unmapped, destroying {}", surface, id);
                    self.remove_exported(id, Release::KeepInert);
                }
                SurfaceListener::ChildUnmap(import, child) => {
                    if self.remove_child_link(import, child).is_some() {
                        self.host.set_parent(child, None);
                    }
                }
                SurfaceListener::ChildSetParent(..) => {}
            }
        }
    }

    /// Report that a toplevel's parent was changed by the compositor or its
    /// own client. Child links on that surface are dropped; the new parent
    /// is left alone.
    pub fn surface_parent_changed(&mut self, surface: SurfaceId) {
        for (sub, listener) in self.signals.snapshot(surface, SurfaceEvent::SetParent) {
            if !self.signals.is_live(sub) {
                continue;
            }
            if let SurfaceListener::ChildSetParent(import, child) = listener {
                self.remove_child_link(import, child);
            }
        }
    }

    /// Destroy every object owned by a client that went away
    pub fn client_disconnected(&mut self, client: ClientId) {
        let cleanup = self.resources.unregister_client(client);
        if !cleanup.is_empty() {
            log::info!("Cleaning up {} foreign registries of {}", cleanup.len(), client);
        }
        for request in cleanup {
            match request {
                CleanupRequest::DestroyImporter(id) => {
                    self.remove_importer(id, Release::Resource);
                }
                CleanupRequest::DestroyExporter(id) => {
                    self.remove_exporter(id, Release::Resource);
                }
            }
        }
        self.inert_exports.retain(|_, owner| *owner != client);
        self.inert_imports.retain(|_, owner| *owner != client);
    }

    /// Post a fatal protocol error and terminate the client
    pub fn post_error<D>(&mut self, display: &mut Display<D>, client: ClientId, error: ProtocolError) {
        log::warn!("Protocol error for {}: {}", client, error);
        self.queue_event(client, Event::Error(error));
        self.client_disconnected(client);
        display.disconnect(client);
    }

    /// Handle one request from a client. Returns the object created by the
    /// request, if any. Fatal errors have already been posted to the client
    /// (and the client terminated) when this returns `Err`.
    pub fn dispatch<D>(
        &mut self,
        display: &mut Display<D>,
        client: ClientId,
        request: Request,
    ) -> ForeignResult<Option<ObjectId>> {
        let object = request.object();
        log::debug!(
            "{}: {}.{} (opcode {})",
            client,
            object,
            request.name(),
            request.opcode()
        );

        if !display.is_connected(client) {
            return Err(ForeignError::NotConnected(client));
        }
        if !self.resources.client_owns(client, object) {
            let err = ProtocolError::invalid_object(object);
            self.post_error(display, client, err.clone());
            return Err(err.into());
        }

        let result = match request {
            Request::Exporter(id, ExporterRequest::Destroy) => {
                self.destroy_exporter(id).map(|_| None)
            }
            Request::Exporter(id, ExporterRequest::Export { surface }) => self
                .export_toplevel(id, surface)
                .map(|exported| Some(exported.into())),
            Request::Exported(id, ExportedRequest::Destroy) => {
                self.destroy_exported(id).map(|_| None)
            }
            Request::Importer(id, ImporterRequest::Destroy) => {
                self.destroy_importer(id).map(|_| None)
            }
            Request::Importer(id, ImporterRequest::Import { handle }) => self
                .import_toplevel(id, &handle)
                .map(|imported| Some(imported.into())),
            Request::Imported(id, ImportedRequest::Destroy) => {
                self.destroy_imported(id).map(|_| None)
            }
            Request::Imported(id, ImportedRequest::SetParentOf { surface }) => {
                self.set_parent_of(id, surface).map(|_| None)
            }
        };

        if let Err(ForeignError::Protocol(err)) = &result {
            self.post_error(display, client, err.clone());
        }
        result
    }

    /// Handles of every live export
    pub fn exported_handles(&self) -> Vec<Handle> {
        self.exports().map(|(_, e)| e.handle.clone()).collect()
    }

    /// Every live export, exporter by exporter
    pub fn exports(&self) -> impl Iterator<Item = (ExportId, &Exported)> + '_ {
        self.exporters
            .values()
            .flat_map(|exporter| exporter.exports.iter().map(|(id, e)| (*id, e)))
    }

    /// Every live import, importer by importer
    pub fn imports(&self) -> impl Iterator<Item = (ImportId, &Imported)> + '_ {
        self.importers
            .values()
            .flat_map(|importer| importer.imports.iter().map(|(id, i)| (*id, i)))
    }

    pub fn exporter(&self, id: ExporterId) -> Option<&Exporter> {
        self.exporters.get(&id)
    }

    pub fn importer(&self, id: ImporterId) -> Option<&Importer> {
        self.importers.get(&id)
    }

    pub fn exported(&self, id: ExportId) -> Option<&Exported> {
        self.exporters.get(&id.exporter)?.exports.get(&id)
    }

    pub fn imported(&self, id: ImportId) -> Option<&Imported> {
        self.importers.get(&id.importer)?.imports.get(&id)
    }

    fn exported_mut(&mut self, id: ExportId) -> Option<&mut Exported> {
        self.exporters.get_mut(&id.exporter)?.exports.get_mut(&id)
    }

    fn imported_mut(&mut self, id: ImportId) -> Option<&mut Imported> {
        self.importers.get_mut(&id.importer)?.imports.get_mut(&id)
    }

    /// Whether the object was destroyed by the server and only waits for the
    /// client's `destroy`
    pub fn is_inert(&self, object: ObjectId) -> bool {
        match object {
            ObjectId::Exported(id) => self.inert_exports.contains_key(&id),
            ObjectId::Imported(id) => self.inert_imports.contains_key(&id),
            ObjectId::Exporter(_) | ObjectId::Importer(_) => false,
        }
    }

    /// Number of live surface subscriptions held by exports and child links
    pub fn subscription_count(&self) -> usize {
        self.signals.len()
    }

    /// Walk every object and report broken cross references: an import and
    /// its export must point at each other, and every subscription held by
    /// an object must still be registered.
    pub fn link_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut expected_subscriptions = 0;

        for (id, exported) in self.exports() {
            expected_subscriptions += 1;
            if !self.signals.is_live(exported.unmap) {
                problems.push(format!("{} lost its unmap subscription", id));
            }
            for import in &exported.imports {
                match self.imported(*import) {
                    Some(imported) if imported.exported == Some(id) => {}
                    Some(_) => problems.push(format!("{} lists {} which points elsewhere", id, import)),
                    None => problems.push(format!("{} lists dead {}", id, import)),
                }
            }
        }

        for (id, imported) in self.imports() {
            if let Some(export) = imported.exported {
                match self.exported(export) {
                    Some(exported) if exported.imports.contains(&id) => {}
                    Some(_) => problems.push(format!("{} not listed by {}", id, export)),
                    None => problems.push(format!("{} points at dead {}", id, export)),
                }
            }
            for child in &imported.children {
                expected_subscriptions += 2;
                if !self.signals.is_live(child.unmap) || !self.signals.is_live(child.set_parent) {
                    problems.push(format!("{} child {} lost a subscription", id, child.surface));
                }
            }
        }

        for id in self.inert_exports.keys() {
            if self.exported(*id).is_some() {
                problems.push(format!("{} is both live and inert", id));
            }
        }
        for id in self.inert_imports.keys() {
            if self.imported(*id).is_some() {
                problems.push(format!("{} is both live and inert", id));
            }
        }

        if self.signals.len() != expected_subscriptions {
            problems.push(format!(
                "{} subscriptions registered, {} owned by live objects",
                self.signals.len(),
                expected_subscriptions
            ));
        }

        problems
    }
}

/// What happens to the client's protocol object when the server destroys
/// the state behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Release {
    /// The client asked for it, or is gone: forget the object
    Resource,
    /// The client still holds it: keep the id until it sends `destroy`
    KeepInert,
}

/// The surface must be an xdg_surface with the toplevel role
fn verify_is_toplevel<H: SurfaceHost>(
    host: &H,
    object: ObjectId,
    surface: SurfaceId,
) -> Result<(), ProtocolError> {
    match host.role(surface) {
        Some(SurfaceRole::Toplevel) => Ok(()),
        Some(_) => Err(ProtocolError::not_toplevel(object)),
        None => Err(ProtocolError::not_xdg_surface(object)),
    }
}
