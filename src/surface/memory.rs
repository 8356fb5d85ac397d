//! In-memory surface host
//!
//! Keeps just enough surface state for the foreign protocol: whether a
//! surface is an xdg_surface, its role, whether it is mapped, and its
//! toplevel parent. Useful for headless compositors and for testing the
//! protocol without a real shell.

use super::*;
use crate::protocol::SurfaceId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct SurfaceState {
    /// `None` for surfaces outside xdg-shell (subsurfaces, cursors, ...)
    role: Option<SurfaceRole>,
    mapped: bool,
    parent: Option<SurfaceId>,
}

#[derive(Debug, Default)]
pub struct MemorySurfaces {
    surfaces: HashMap<SurfaceId, SurfaceState>,
    next_surface_id: u32,
}

impl MemorySurfaces {
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
            next_surface_id: 1,
        }
    }

    fn insert(&mut self, role: Option<SurfaceRole>) -> SurfaceId {
        let id = SurfaceId::new(self.next_surface_id.max(1));
        self.next_surface_id = id.get() + 1;
        self.surfaces.insert(
            id,
            SurfaceState {
                role,
                mapped: true,
                parent: None,
            },
        );
        id
    }

    /// Create a mapped xdg_toplevel
    pub fn create_toplevel(&mut self) -> SurfaceId {
        self.insert(Some(SurfaceRole::Toplevel))
    }

    /// Create a mapped xdg_popup
    pub fn create_popup(&mut self) -> SurfaceId {
        self.insert(Some(SurfaceRole::Popup))
    }

    /// Create an xdg_surface that has no role yet
    pub fn create_xdg_surface(&mut self) -> SurfaceId {
        self.insert(Some(SurfaceRole::None))
    }

    /// Create a surface outside xdg-shell
    pub fn create_plain(&mut self) -> SurfaceId {
        self.insert(None)
    }

    pub fn exists(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    pub fn is_mapped(&self, surface: SurfaceId) -> bool {
        self.surfaces.get(&surface).is_some_and(|s| s.mapped)
    }

    /// Mark the surface unmapped. The compositor is expected to report this
    /// to the coordinator afterwards.
    pub fn unmap(&mut self, surface: SurfaceId) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.mapped = false;
        }
    }

    /// Forget a surface entirely; children keep no pointer to it
    pub fn destroy(&mut self, surface: SurfaceId) {
        self.surfaces.remove(&surface);
        for state in self.surfaces.values_mut() {
            if state.parent == Some(surface) {
                state.parent = None;
            }
        }
    }

    /// Surfaces whose toplevel parent is `parent`
    pub fn children(&self, parent: SurfaceId) -> Vec<SurfaceId> {
        let mut children: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect();
        children.sort();
        children
    }
}

impl SurfaceHost for MemorySurfaces {
    fn role(&self, surface: SurfaceId) -> Option<SurfaceRole> {
        self.surfaces.get(&surface).and_then(|s| s.role)
    }

    fn parent(&self, surface: SurfaceId) -> Option<SurfaceId> {
        self.surfaces.get(&surface).and_then(|s| s.parent)
    }

    fn set_parent(&mut self, surface: SurfaceId, parent: Option<SurfaceId>) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.parent = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let mut host = MemorySurfaces::new();
        let toplevel = host.create_toplevel();
        let popup = host.create_popup();
        let plain = host.create_plain();

        assert_eq!(host.role(toplevel), Some(SurfaceRole::Toplevel));
        assert_eq!(host.role(popup), Some(SurfaceRole::Popup));
        assert_eq!(host.role(plain), None);
        assert!(host.is_xdg_surface(popup));
        assert!(!host.is_xdg_surface(plain));
        assert!(!host.is_xdg_surface(SurfaceId::new(999)));
    }

    #[test]
    fn test_parenting() {
        let mut host = MemorySurfaces::new();
        let parent = host.create_toplevel();
        let child = host.create_toplevel();

        host.set_parent(child, Some(parent));
        assert_eq!(host.parent(child), Some(parent));
        assert_eq!(host.children(parent), vec![child]);

        host.destroy(parent);
        assert_eq!(host.parent(child), None);
    }

    #[test]
    fn test_unmap() {
        let mut host = MemorySurfaces::new();
        let surface = host.create_toplevel();
        assert!(host.is_mapped(surface));
        host.unmap(surface);
        assert!(!host.is_mapped(surface));
        assert!(host.exists(surface));
    }
}
