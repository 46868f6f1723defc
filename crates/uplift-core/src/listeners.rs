//! Side-table of attached event listeners keyed by element identity.
//!
//! Nothing is stored on the elements themselves. Each registration returns a
//! [`ListenerId`]; removal needs the exact `(node, id)` pair, which is what
//! makes remove-then-add re-enhancement safe.
//!
//! A widget whose root leaves the document has its listeners *suspended*:
//! they move out of the live table, keep their ids, and come back unchanged
//! if the root is reinserted.

use crate::component::WidgetId;
use crate::dom::NodeId;
use crate::event::{DomEvent, EventKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps an event to an optional widget message.
pub type Handler<M> = Arc<dyn Fn(&DomEvent) -> Option<M> + Send + Sync>;

/// Reference to one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Errors from listener bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    /// The `(node, id)` pair is not (or no longer) registered.
    #[error("listener {id:?} is not attached to node {node}")]
    NotAttached {
        /// Node the caller expected the listener on.
        node: NodeId,
        /// The stale listener reference.
        id: ListenerId,
    },
}

struct Entry<M> {
    id: ListenerId,
    kind: EventKind,
    owner: WidgetId,
    handler: Handler<M>,
}

/// Listener side-table.
pub struct Listeners<M> {
    next_id: u64,
    table: HashMap<NodeId, Vec<Entry<M>>>,
    suspended: HashMap<WidgetId, Vec<(NodeId, Entry<M>)>>,
}

impl<M> Default for Listeners<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Listeners<M> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            table: HashMap::new(),
            suspended: HashMap::new(),
        }
    }

    /// Attach `handler` for `kind` events on `node`, owned by `owner`.
    pub fn add(&mut self, node: NodeId, kind: EventKind, owner: WidgetId, handler: Handler<M>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.table.entry(node).or_default().push(Entry {
            id,
            kind,
            owner,
            handler,
        });
        id
    }

    /// Detach one listener.
    pub fn remove(&mut self, node: NodeId, id: ListenerId) -> Result<(), ListenerError> {
        let entries = self
            .table
            .get_mut(&node)
            .ok_or(ListenerError::NotAttached { node, id })?;
        let index = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(ListenerError::NotAttached { node, id })?;
        entries.remove(index);
        if entries.is_empty() {
            self.table.remove(&node);
        }
        Ok(())
    }

    /// Detach everything `owner` registered, suspended or not. Returns how
    /// many listeners went away.
    pub fn remove_owner(&mut self, owner: WidgetId) -> usize {
        let suspended = self.suspended.remove(&owner).map_or(0, |entries| entries.len());
        self.take_owner(owner).len() + suspended
    }

    /// Move everything `owner` registered out of the live table. Returns how
    /// many listeners were suspended.
    pub fn suspend_owner(&mut self, owner: WidgetId) -> usize {
        let taken = self.take_owner(owner);
        let count = taken.len();
        if count > 0 {
            self.suspended.entry(owner).or_default().extend(taken);
        }
        count
    }

    /// Put `owner`'s suspended listeners back, after any registered since.
    /// Returns how many listeners were restored.
    pub fn resume_owner(&mut self, owner: WidgetId) -> usize {
        let Some(entries) = self.suspended.remove(&owner) else {
            return 0;
        };
        let count = entries.len();
        for (node, entry) in entries {
            self.table.entry(node).or_default().push(entry);
        }
        count
    }

    /// Number of listeners suspended for `owner`.
    pub fn suspended(&self, owner: WidgetId) -> usize {
        self.suspended.get(&owner).map_or(0, Vec::len)
    }

    fn take_owner(&mut self, owner: WidgetId) -> Vec<(NodeId, Entry<M>)> {
        let mut taken = Vec::new();
        self.table.retain(|node, entries| {
            let (mine, rest): (Vec<_>, Vec<_>) = entries.drain(..).partition(|e| e.owner == owner);
            taken.extend(mine.into_iter().map(|e| (*node, e)));
            *entries = rest;
            !entries.is_empty()
        });
        taken.sort_by_key(|(_, e)| e.id);
        taken
    }

    /// Handlers for `kind` on `node`, in registration order.
    pub fn handlers(&self, node: NodeId, kind: EventKind) -> Vec<(WidgetId, Handler<M>)> {
        self.table
            .get(&node)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| (e.owner, Arc::clone(&e.handler)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners on `node`.
    pub fn count(&self, node: NodeId) -> usize {
        self.table.get(&node).map_or(0, Vec::len)
    }

    /// Number of listeners on `node` for `kind`.
    pub fn count_kind(&self, node: NodeId, kind: EventKind) -> usize {
        self.table
            .get(&node)
            .map_or(0, |entries| entries.iter().filter(|e| e.kind == kind).count())
    }

    /// Total number of attached listeners.
    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Whether no listener is attached.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Where a [`Context`](crate::Context) sends listener registrations.
///
/// The engine implements this for the widget currently being enhanced or
/// updated; [`Context::scope`](crate::Context::scope) wraps it so a child
/// widget's message type can be lifted into the union message type.
pub trait ListenerSink<M> {
    /// Register a handler.
    fn add(&mut self, node: NodeId, kind: EventKind, handler: Handler<M>) -> ListenerId;
    /// Remove a handler by reference.
    fn remove(&mut self, node: NodeId, id: ListenerId) -> Result<(), ListenerError>;
}

/// Sink that tags every registration with its owning widget.
pub(crate) struct OwnedSink<'a, M> {
    pub(crate) listeners: &'a mut Listeners<M>,
    pub(crate) owner: WidgetId,
}

impl<M> ListenerSink<M> for OwnedSink<'_, M> {
    fn add(&mut self, node: NodeId, kind: EventKind, handler: Handler<M>) -> ListenerId {
        self.listeners.add(node, kind, self.owner, handler)
    }

    fn remove(&mut self, node: NodeId, id: ListenerId) -> Result<(), ListenerError> {
        self.listeners.remove(node, id)
    }
}

/// Sink that lifts a child message type `N` into `M` before registering.
pub(crate) struct MapSink<'a, M, N> {
    pub(crate) inner: &'a mut dyn ListenerSink<M>,
    pub(crate) lift: Arc<dyn Fn(N) -> M + Send + Sync>,
}

impl<M: 'static, N: 'static> ListenerSink<N> for MapSink<'_, M, N> {
    fn add(&mut self, node: NodeId, kind: EventKind, handler: Handler<N>) -> ListenerId {
        let lift = Arc::clone(&self.lift);
        self.inner
            .add(node, kind, Arc::new(move |ev| handler(ev).map(|msg| lift(msg))))
    }

    fn remove(&mut self, node: NodeId, id: ListenerId) -> Result<(), ListenerError> {
        self.inner.remove(node, id)
    }
}
