use std::{collections::HashMap, fmt, sync::Arc};

use alloy_primitives::{Address, ChainId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::{
    connector::Connector,
    events::{EventKind, ListenerId},
};

/// Global connection status of the store.
///
/// `Connecting` is transient: every establishing action resolves it to
/// `Connected` or rolls back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// An established connection to a wallet backend.
///
/// Replaced wholesale on reconnection, never mutated in place.
#[derive(Clone)]
pub struct Connection {
    /// Ordered account list; non-empty by the connector contract.
    pub accounts: Vec<Address>,
    pub chain_id: ChainId,
    pub connector: Arc<dyn Connector>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("accounts", &self.accounts)
            .field("chain_id", &self.chain_id)
            .field("connector", &self.connector.uid())
            .finish()
    }
}

/// One immutable snapshot of the connection store.
///
/// Invariant: `status == Connected` iff `current` is set and maps to an entry
/// in `connections`.
#[derive(Clone, Debug)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    /// Active chain id of the store, set from the configured chain list.
    pub chain_id: ChainId,
    /// Uid of the current connector, if any.
    pub current: Option<Uuid>,
    pub connections: HashMap<Uuid, Connection>,
}

impl ConnectionState {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            chain_id,
            current: None,
            connections: HashMap::new(),
        }
    }

    /// The connection of the current connector, if one is established.
    pub fn current_connection(&self) -> Option<&Connection> {
        self.current.and_then(|uid| self.connections.get(&uid))
    }
}

/// Process-wide connection state with atomic whole-state replacement.
///
/// Every mutation replaces the entire snapshot, so concurrent readers never
/// observe a half-written state. Concurrent establishing actions against the
/// same connector are not mutually excluded; commits are last-write-wins.
///
/// Also owns the per-connector subscription table: the set of listener
/// registrations the orchestrator holds on each connector's emitter, replaced
/// as a whole on every (re)connect so no handler leaks across reconnects.
#[derive(Clone)]
pub struct ConnectionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<ConnectionState>,
    subscriptions: Mutex<HashMap<Uuid, Vec<(EventKind, ListenerId)>>>,
}

impl ConnectionStore {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(ConnectionState::new(chain_id)),
                subscriptions: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.read().clone()
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.read().status
    }

    /// Replaces the state with a functional update over the previous
    /// snapshot.
    pub fn set_state(&self, update: impl FnOnce(&ConnectionState) -> ConnectionState) {
        let mut state = self.inner.state.write();
        let next = update(&state);
        trace!(
            target: "wallet::connect",
            status = ?next.status,
            current = ?next.current,
            connections = next.connections.len(),
            "store transition"
        );
        *state = next;
    }

    /// Replaces the subscription set registered for a connector, returning
    /// the previous set so the caller can detach it from the emitter.
    pub(crate) fn replace_subscriptions(
        &self,
        uid: Uuid,
        subscriptions: Vec<(EventKind, ListenerId)>,
    ) -> Vec<(EventKind, ListenerId)> {
        self.inner.subscriptions.lock().insert(uid, subscriptions).unwrap_or_default()
    }

    /// Removes and returns the subscription set registered for a connector.
    pub(crate) fn take_subscriptions(&self, uid: Uuid) -> Vec<(EventKind, ListenerId)> {
        self.inner.subscriptions.lock().remove(&uid).unwrap_or_default()
    }

    /// Event sink for a connector-initiated `connect`: commits the connection
    /// as current.
    pub(crate) fn apply_connect(
        &self,
        connector: Arc<dyn Connector>,
        accounts: Vec<Address>,
        chain_id: ChainId,
    ) {
        let uid = connector.uid();
        self.set_state(|state| {
            let mut connections = state.connections.clone();
            connections.insert(uid, Connection { accounts: accounts.clone(), chain_id, connector: connector.clone() });
            ConnectionState {
                status: ConnectionStatus::Connected,
                chain_id: state.chain_id,
                current: Some(uid),
                connections,
            }
        });
    }

    /// Event sink for `change`: updates the affected connection in place of
    /// its snapshot, leaving everything else untouched.
    pub(crate) fn apply_change(
        &self,
        uid: Uuid,
        accounts: Option<Vec<Address>>,
        chain_id: Option<ChainId>,
    ) {
        self.set_state(|state| {
            let mut next = state.clone();
            if let Some(connection) = next.connections.get_mut(&uid) {
                if let Some(accounts) = accounts {
                    connection.accounts = accounts;
                }
                if let Some(chain_id) = chain_id {
                    connection.chain_id = chain_id;
                }
            }
            next
        });
    }

    /// Event sink for `disconnect`: drops the connection and repairs
    /// `current`/`status`.
    pub(crate) fn apply_disconnect(&self, uid: Uuid) {
        self.take_subscriptions(uid);
        self.set_state(|state| {
            let mut connections = state.connections.clone();
            connections.remove(&uid);
            let current = if state.current == Some(uid) {
                connections.keys().next().copied()
            } else {
                state.current
            };
            let status = if current.is_some() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            };
            ConnectionState { status, chain_id: state.chain_id, current, connections }
        });
    }
}

impl fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStore").field("state", &self.state()).finish()
    }
}
