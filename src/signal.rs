//! Typed signals
//!
//! A [`Signal`] is an ordered list of listeners keyed by [`ListenerId`].
//! Emission is done over a snapshot so that listeners may be removed while
//! a cascade is in progress; a listener removed earlier in the same cascade
//! is skipped by checking [`Signal::contains`] before delivering to it.

use crate::protocol::{ExportId, ImportId, SurfaceId};
use std::collections::HashMap;
use std::fmt;

/// Identifies one listener within a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Ordered listener list
pub struct Signal<L> {
    listeners: Vec<(ListenerId, L)>,
    next_id: u64,
}

impl<L> Default for Signal<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> fmt::Debug for Signal<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<L> Signal<L> {
    pub fn new() -> Self {
        Signal {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a listener, returning the token needed to remove it
    pub fn add(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Add a listener under an id allocated by the caller
    fn insert(&mut self, id: ListenerId, listener: L) {
        self.listeners.push((id, listener));
    }

    /// Remove a listener; `None` if it was already gone
    pub fn remove(&mut self, id: ListenerId) -> Option<L> {
        let pos = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        Some(self.listeners.remove(pos).1)
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(lid, _)| *lid == id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Take every listener out, for signals that fire once
    pub fn drain(&mut self) -> Vec<(ListenerId, L)> {
        std::mem::take(&mut self.listeners)
    }
}

impl<L: Clone> Signal<L> {
    /// Copy of the current listeners, in registration order
    pub fn snapshot(&self) -> Vec<(ListenerId, L)> {
        self.listeners.clone()
    }
}

/// Surface lifecycle events the foreign protocol observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEvent {
    /// The surface was unmapped or destroyed
    Unmap,
    /// The toplevel's parent changed
    SetParent,
}

/// Who is listening, and what to tear down when the event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceListener {
    /// Exported surface self-destroys on unmap
    ExportedUnmap(ExportId),
    /// Child link dropped when the child is unmapped
    ChildUnmap(ImportId, SurfaceId),
    /// Child link dropped when the child is re-parented
    ChildSetParent(ImportId, SurfaceId),
}

/// Token held by a subscriber and cancelled when the subscriber is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub surface: SurfaceId,
    pub event: SurfaceEvent,
    listener: ListenerId,
}

#[derive(Debug, Default)]
struct SurfaceEvents {
    unmap: Signal<SurfaceListener>,
    set_parent: Signal<SurfaceListener>,
}

impl SurfaceEvents {
    fn signal(&self, event: SurfaceEvent) -> &Signal<SurfaceListener> {
        match event {
            SurfaceEvent::Unmap => &self.unmap,
            SurfaceEvent::SetParent => &self.set_parent,
        }
    }

    fn signal_mut(&mut self, event: SurfaceEvent) -> &mut Signal<SurfaceListener> {
        match event {
            SurfaceEvent::Unmap => &mut self.unmap,
            SurfaceEvent::SetParent => &mut self.set_parent,
        }
    }

    fn is_empty(&self) -> bool {
        self.unmap.is_empty() && self.set_parent.is_empty()
    }
}

/// Per-surface unmap and set_parent signals
///
/// Listener ids are allocated here rather than per surface, so a token for a
/// cancelled subscription never matches a later one on the same surface.
#[derive(Debug)]
pub struct SurfaceSignals {
    surfaces: HashMap<SurfaceId, SurfaceEvents>,
    next_id: u64,
}

impl Default for SurfaceSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceSignals {
    pub fn new() -> Self {
        SurfaceSignals {
            surfaces: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(
        &mut self,
        surface: SurfaceId,
        event: SurfaceEvent,
        listener: SurfaceListener,
    ) -> Subscription {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.surfaces
            .entry(surface)
            .or_default()
            .signal_mut(event)
            .insert(id, listener);
        Subscription {
            surface,
            event,
            listener: id,
        }
    }

    /// Cancel a subscription. Returns false if it was already gone, which
    /// callers tolerate so that a cascade is never aborted halfway.
    pub fn cancel(&mut self, sub: Subscription) -> bool {
        let Some(events) = self.surfaces.get_mut(&sub.surface) else {
            return false;
        };
        let removed = events.signal_mut(sub.event).remove(sub.listener).is_some();
        if events.is_empty() {
            self.surfaces.remove(&sub.surface);
        }
        removed
    }

    pub fn is_live(&self, sub: Subscription) -> bool {
        self.surfaces
            .get(&sub.surface)
            .is_some_and(|events| events.signal(sub.event).contains(sub.listener))
    }

    /// Listeners of one surface event, captured before delivery starts
    pub fn snapshot(
        &self,
        surface: SurfaceId,
        event: SurfaceEvent,
    ) -> Vec<(Subscription, SurfaceListener)> {
        let Some(events) = self.surfaces.get(&surface) else {
            return Vec::new();
        };
        events
            .signal(event)
            .snapshot()
            .into_iter()
            .map(|(listener, l)| {
                (
                    Subscription {
                        surface,
                        event,
                        listener,
                    },
                    l,
                )
            })
            .collect()
    }

    /// Total number of live subscriptions
    pub fn len(&self) -> usize {
        self.surfaces
            .values()
            .map(|e| e.unmap.len() + e.set_parent.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ImporterId;

    #[test]
    fn test_signal_add_remove() {
        let mut signal = Signal::new();
        let a = signal.add("a");
        let b = signal.add("b");
        assert_eq!(signal.len(), 2);
        assert_eq!(signal.remove(a), Some("a"));
        assert_eq!(signal.remove(a), None);
        assert!(signal.contains(b));
    }

    #[test]
    fn test_signal_drain_fires_once() {
        let mut signal = Signal::new();
        signal.add(1);
        signal.add(2);
        let fired: Vec<i32> = signal.drain().into_iter().map(|(_, v)| v).collect();
        assert_eq!(fired, vec![1, 2]);
        assert!(signal.drain().is_empty());
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let mut signals = SurfaceSignals::new();
        let surface = SurfaceId(1);
        let import = ImportId {
            importer: ImporterId(1),
            serial: 1,
        };
        let first = signals.subscribe(
            surface,
            SurfaceEvent::Unmap,
            SurfaceListener::ChildUnmap(import, surface),
        );
        let second = signals.subscribe(
            surface,
            SurfaceEvent::Unmap,
            SurfaceListener::ChildUnmap(import, SurfaceId(2)),
        );

        let snapshot = signals.snapshot(surface, SurfaceEvent::Unmap);
        assert_eq!(snapshot.len(), 2);

        assert!(signals.cancel(second));
        assert!(signals.is_live(first));
        assert!(!signals.is_live(snapshot[1].0));
        assert!(!signals.cancel(second));
    }

    #[test]
    fn test_empty_surfaces_are_dropped() {
        let mut signals = SurfaceSignals::new();
        let export = ExportId {
            exporter: crate::protocol::ExporterId(1),
            serial: 1,
        };
        let sub = signals.subscribe(
            SurfaceId(3),
            SurfaceEvent::Unmap,
            SurfaceListener::ExportedUnmap(export),
        );
        assert_eq!(signals.len(), 1);
        signals.cancel(sub);
        assert!(signals.is_empty());

        let again = signals.subscribe(
            SurfaceId(3),
            SurfaceEvent::Unmap,
            SurfaceListener::ExportedUnmap(export),
        );
        assert!(signals.is_live(again));
        assert!(!signals.is_live(sub));
    }
}
