//! Synchronous, per-graph event notification.
//!
//! Listeners subscribe to one [`EventKind`] and are dispatched in
//! registration order on the caller's stack. Dispatch is re-entrant: a
//! handler may mutate the graph, and the events that produces run to
//! completion before control returns to the outer dispatch. An event that
//! reaches a handler while that handler is still running is deferred and
//! delivered once the current invocation returns, which keeps re-entry
//! from borrowing the same listener twice without losing events.
//!
//! Listener identity is the opaque [`ListenerId`] returned at registration,
//! not closure equality.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::change::Change;
use crate::graph::Graph;

use trellis_core::CellId;

/// Event categories used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// One top-level transaction committed.
    Change,
    CellsAdded,
    CellsRemoved,
    CellsResized,
    Undone,
    Redone,
}

/// A notification fired by the graph, with its typed payload.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    /// Fired once per top-level transaction with the full ordered change
    /// list, exactly as it will appear on the undo stack.
    Change { changes: Vec<Change> },
    CellsAdded { cells: Vec<CellId> },
    CellsRemoved { cells: Vec<CellId> },
    CellsResized { cells: Vec<CellId> },
    Undone { changes: Vec<Change> },
    Redone { changes: Vec<Change> },
}

impl GraphEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GraphEvent::Change { .. } => EventKind::Change,
            GraphEvent::CellsAdded { .. } => EventKind::CellsAdded,
            GraphEvent::CellsRemoved { .. } => EventKind::CellsRemoved,
            GraphEvent::CellsResized { .. } => EventKind::CellsResized,
            GraphEvent::Undone { .. } => EventKind::Undone,
            GraphEvent::Redone { .. } => EventKind::Redone,
        }
    }
}

/// Opaque handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A graph event handler.
///
/// Handlers receive the graph mutably so reactive components (layout
/// managers) can issue further mutations inside their own transaction.
pub trait GraphListener {
    fn on_event(&mut self, graph: &mut Graph, event: &GraphEvent);
}

impl<F> GraphListener for F
where
    F: FnMut(&mut Graph, &GraphEvent),
{
    fn on_event(&mut self, graph: &mut Graph, event: &GraphEvent) {
        self(graph, event)
    }
}

struct Registration {
    id: ListenerId,
    kind: EventKind,
    handler: Rc<RefCell<dyn GraphListener>>,
    deferred: Rc<RefCell<VecDeque<GraphEvent>>>,
}

/// A dispatch target: the handler plus the queue of events that reached it
/// while it was already running.
pub(crate) struct Subscriber {
    handler: Rc<RefCell<dyn GraphListener>>,
    deferred: Rc<RefCell<VecDeque<GraphEvent>>>,
}

impl Subscriber {
    pub(crate) fn handler(&self) -> &RefCell<dyn GraphListener> {
        &self.handler
    }

    pub(crate) fn defer(&self, event: GraphEvent) {
        self.deferred.borrow_mut().push_back(event);
    }

    pub(crate) fn next_deferred(&self) -> Option<GraphEvent> {
        self.deferred.borrow_mut().pop_front()
    }
}

/// Registration-ordered listener table.
#[derive(Default)]
pub(crate) struct ListenerTable {
    next_id: u64,
    entries: Vec<Registration>,
}

impl ListenerTable {
    pub(crate) fn add(
        &mut self,
        kind: EventKind,
        handler: Rc<RefCell<dyn GraphListener>>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Registration {
            id,
            kind,
            handler,
            deferred: Rc::new(RefCell::new(VecDeque::new())),
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    /// Snapshot of the subscribers for a kind, in registration order.
    /// Cloned so dispatch does not hold a borrow of the table while handlers
    /// mutate the graph.
    pub(crate) fn matching(&self, kind: EventKind) -> Vec<Subscriber> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Subscriber {
                handler: Rc::clone(&entry.handler),
                deferred: Rc::clone(&entry.deferred),
            })
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
