//! Display session
//!
//! The part of the display that the foreign protocol needs: a table of
//! advertised globals, the set of connected clients, and a destroy signal
//! fired once when the whole session shuts down. Destroy listeners get the
//! compositor state `D`, which is where protocol state such as the foreign
//! coordinator lives.

use crate::protocol::ClientId;
use crate::signal::{ListenerId, Signal};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Advertised global ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalId(pub u32);

/// Global metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalInfo {
    pub interface: &'static str,
    pub version: u32,
}

/// Listener run when the display is terminated
pub type DestroyListener<D> = Box<dyn FnOnce(&mut D)>;

pub struct Display<D> {
    /// Globals currently advertised to clients
    globals: BTreeMap<GlobalId, GlobalInfo>,

    /// Next global ID to allocate
    next_global_id: u32,

    /// Connected clients
    clients: BTreeSet<ClientId>,

    /// Next client ID to allocate
    next_client_id: u32,

    /// Fired once by `terminate`
    destroy: Signal<DestroyListener<D>>,

    terminated: bool,
}

impl<D> fmt::Debug for Display<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("globals", &self.globals)
            .field("clients", &self.clients)
            .field("destroy", &self.destroy)
            .field("terminated", &self.terminated)
            .finish()
    }
}

impl<D> Default for Display<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Display<D> {
    pub fn new() -> Self {
        Display {
            globals: BTreeMap::new(),
            next_global_id: 1,
            clients: BTreeSet::new(),
            next_client_id: 1,
            destroy: Signal::new(),
            terminated: false,
        }
    }

    /// Advertise a new global
    pub fn create_global(&mut self, interface: &'static str, version: u32) -> GlobalId {
        let id = GlobalId(self.next_global_id);
        self.next_global_id += 1;
        self.globals.insert(id, GlobalInfo { interface, version });
        log::info!("Created global {} v{} (id {})", interface, version, id.0);
        id
    }

    /// Stop advertising a global; false if it was already gone
    pub fn destroy_global(&mut self, id: GlobalId) -> bool {
        match self.globals.remove(&id) {
            Some(info) => {
                log::info!("Destroyed global {} (id {})", info.interface, id.0);
                true
            }
            None => false,
        }
    }

    pub fn global(&self, id: GlobalId) -> Option<&GlobalInfo> {
        self.globals.get(&id)
    }

    /// Find a global by interface name
    pub fn find_global(&self, interface: &str) -> Option<GlobalId> {
        self.globals
            .iter()
            .find(|(_, info)| info.interface == interface)
            .map(|(id, _)| *id)
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalInfo)> + '_ {
        self.globals.iter().map(|(id, info)| (*id, info))
    }

    /// Register a new client connection
    pub fn create_client(&mut self) -> ClientId {
        let id = ClientId::new(self.next_client_id);
        self.next_client_id += 1;
        self.clients.insert(id);
        log::info!("New client connection {}", id);
        id
    }

    pub fn is_connected(&self, client: ClientId) -> bool {
        self.clients.contains(&client)
    }

    /// Drop a client connection; false if it was not connected
    pub fn disconnect(&mut self, client: ClientId) -> bool {
        let removed = self.clients.remove(&client);
        if removed {
            log::info!("Client {} disconnected", client);
        }
        removed
    }

    pub fn add_destroy_listener(&mut self, listener: DestroyListener<D>) -> ListenerId {
        self.destroy.add(listener)
    }

    pub fn remove_destroy_listener(&mut self, id: ListenerId) -> bool {
        self.destroy.remove(id).is_some()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Shut the session down: run destroy listeners once, then drop every
    /// global and client. Calling it again does nothing.
    pub fn terminate(&mut self, state: &mut D) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        log::info!("Terminating display");

        for (_, listener) in self.destroy.drain() {
            listener(state);
        }

        self.globals.clear();
        self.clients.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_lifecycle() {
        let mut display: Display<()> = Display::new();
        let id = display.create_global("zxdg_exporter_v1", 1);
        assert_eq!(display.find_global("zxdg_exporter_v1"), Some(id));
        assert!(display.destroy_global(id));
        assert!(!display.destroy_global(id));
        assert!(display.global(id).is_none());
    }

    #[test]
    fn test_client_ids_are_unique() {
        let mut display: Display<()> = Display::new();
        let a = display.create_client();
        let b = display.create_client();
        assert_ne!(a, b);
        assert!(display.disconnect(a));
        assert!(!display.is_connected(a));
        assert!(display.is_connected(b));
    }

    #[test]
    fn test_terminate_fires_once() {
        let mut display: Display<u32> = Display::new();
        display.create_global("zxdg_importer_v1", 1);
        display.add_destroy_listener(Box::new(|count: &mut u32| *count += 1));
        let removed = display.add_destroy_listener(Box::new(|count: &mut u32| *count += 10));
        assert!(display.remove_destroy_listener(removed));

        let mut count = 0;
        display.terminate(&mut count);
        display.terminate(&mut count);
        assert_eq!(count, 1);
        assert!(display.is_terminated());
        assert_eq!(display.globals().count(), 0);
    }
}
