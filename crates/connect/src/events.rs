use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use alloy_primitives::{Address, ChainId};
use parking_lot::Mutex;

/// Lifecycle event categories a connector can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connect,
    Change,
    Disconnect,
    Message,
}

/// Out-of-band messages on the connector's event channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorMessage {
    /// An establishing action has entered its `connecting` phase.
    Connecting,
}

/// Lifecycle event emitted by a connector.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectorEvent {
    /// The connector established a session on its own initiative.
    Connect { accounts: Vec<Address>, chain_id: ChainId },
    /// Accounts or chain of an existing session changed.
    Change { accounts: Option<Vec<Address>>, chain_id: Option<ChainId> },
    /// The session ended on the connector side.
    Disconnect,
    Message(ConnectorMessage),
}

impl ConnectorEvent {
    /// The category this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connect { .. } => EventKind::Connect,
            Self::Change { .. } => EventKind::Change,
            Self::Disconnect => EventKind::Disconnect,
            Self::Message(_) => EventKind::Message,
        }
    }
}

/// Callback attached to a connector's event channel.
pub type EventHandler = Arc<dyn Fn(&ConnectorEvent) + Send + Sync>;

/// Handle of a registered listener, used to detach it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-connector event channel with explicit listener registration.
///
/// Emission is synchronous: `emit` runs every matching handler before it
/// returns, so a listener attached before a state commit cannot miss an event
/// raced against that commit.
#[derive(Default)]
pub struct Emitter {
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a handler for one event category.
    pub fn on(&self, kind: EventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().entry(kind).or_default().push((id, handler));
        id
    }

    /// Detaches a previously attached handler.
    pub fn off(&self, kind: EventKind, id: ListenerId) {
        if let Some(handlers) = self.listeners.lock().get_mut(&kind) {
            handlers.retain(|(listener, _)| *listener != id);
        }
    }

    /// Dispatches an event to every listener of its category.
    pub fn emit(&self, event: &ConnectorEvent) {
        // Handlers run outside the lock; one may re-register listeners.
        let handlers: Vec<EventHandler> = self
            .listeners
            .lock()
            .get(&event.kind())
            .map(|handlers| handlers.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of listeners attached for a category.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        let mut counts = f.debug_struct("Emitter");
        for (kind, handlers) in listeners.iter() {
            counts.field(&format!("{kind:?}"), &handlers.len());
        }
        counts.finish()
    }
}
