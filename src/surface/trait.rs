//! Surface host trait definition
//!
//! The foreign protocol does not own surfaces. It queries their xdg-shell
//! role and sets toplevel parents through this trait. Lifecycle changes
//! (unmap, re-parenting by someone else) are reported back to the
//! coordinator by the compositor, see `XdgForeign::surface_unmapped` and
//! `XdgForeign::surface_parent_changed`.

use crate::protocol::SurfaceId;

/// xdg_surface role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceRole {
    /// xdg_surface without a role object yet
    None,
    Toplevel,
    Popup,
}

/// Access to the compositor's surfaces
pub trait SurfaceHost {
    /// xdg_surface role of the surface, or `None` if it is not an
    /// xdg_surface at all (or does not exist)
    fn role(&self, surface: SurfaceId) -> Option<SurfaceRole>;

    /// Whether the surface takes part in xdg-shell
    fn is_xdg_surface(&self, surface: SurfaceId) -> bool {
        self.role(surface).is_some()
    }

    /// Current toplevel parent
    fn parent(&self, surface: SurfaceId) -> Option<SurfaceId>;

    /// Set or clear the toplevel parent
    fn set_parent(&mut self, surface: SurfaceId, parent: Option<SurfaceId>);
}

impl<H: SurfaceHost + ?Sized> SurfaceHost for Box<H> {
    fn role(&self, surface: SurfaceId) -> Option<SurfaceRole> {
        (**self).role(surface)
    }

    fn is_xdg_surface(&self, surface: SurfaceId) -> bool {
        (**self).is_xdg_surface(surface)
    }

    fn parent(&self, surface: SurfaceId) -> Option<SurfaceId> {
        (**self).parent(surface)
    }

    fn set_parent(&mut self, surface: SurfaceId, parent: Option<SurfaceId>) {
        (**self).set_parent(surface, parent)
    }
}
