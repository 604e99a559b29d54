use std::sync::{Arc, Weak};

use alloy_primitives::ChainId;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{
    connector::{Connector, ConnectorParam},
    error::{ConnectError, StorageError},
    events::{ConnectorEvent, EventKind},
    state::ConnectionStore,
};

/// A chain known to the orchestrator, used to label chain-mismatch failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainDef {
    pub id: ChainId,
    pub name: String,
}

impl ChainDef {
    pub fn new(id: ChainId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// External storage for the single persisted key: the most recently used
/// connector identifier.
pub trait Storage: Send + Sync {
    fn set_recent_connector_id(&self, id: &str) -> Result<(), StorageError>;
    fn recent_connector_id(&self) -> Option<String>;
    fn remove_recent_connector_id(&self);
}

/// In-memory [`Storage`], the default for tests and ephemeral processes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    recent: Mutex<Option<String>>,
}

impl Storage for MemoryStorage {
    fn set_recent_connector_id(&self, id: &str) -> Result<(), StorageError> {
        *self.recent.lock() = Some(id.to_string());
        Ok(())
    }

    fn recent_connector_id(&self) -> Option<String> {
        self.recent.lock().clone()
    }

    fn remove_recent_connector_id(&self) {
        *self.recent.lock() = None;
    }
}

/// Dependency-injected context of every orchestrator action: the connection
/// store, the known chain list, the optional recent-connector storage, and
/// the set of registered connectors.
pub struct Config {
    store: ConnectionStore,
    chains: Vec<ChainDef>,
    storage: Option<Arc<dyn Storage>>,
    connectors: Mutex<Vec<Arc<dyn Connector>>>,
}

impl Config {
    /// Creates a config whose store starts on the first configured chain.
    pub fn new(chains: Vec<ChainDef>) -> Self {
        let chain_id = chains.first().map_or(1, |chain| chain.id);
        Self {
            store: ConnectionStore::new(chain_id),
            chains,
            storage: None,
            connectors: Mutex::new(Vec::new()),
        }
    }

    /// Attaches the recent-connector storage collaborator.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// The connection store of this config.
    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    /// The configured chain list.
    pub fn chains(&self) -> &[ChainDef] {
        &self.chains
    }

    /// Label for a chain id, falling back to a synthetic `Chain {id}` when
    /// the id is not in the configured list.
    pub(crate) fn chain_label(&self, id: ChainId) -> String {
        self.chains
            .iter()
            .find(|chain| chain.id == id)
            .map_or_else(|| format!("Chain {id}"), |chain| chain.name.clone())
    }

    pub(crate) fn chain_mismatch(&self, requested_id: ChainId, current_id: ChainId) -> ConnectError {
        ConnectError::ChainMismatch {
            requested: self.chain_label(requested_id),
            requested_id,
            current_id,
        }
    }

    /// Registers a connector instance and arms its default `connect`
    /// listener, so connector-initiated sessions commit to the store.
    pub fn setup(&self, connector: Arc<dyn Connector>) -> Arc<dyn Connector> {
        let uid = connector.uid();
        trace!(target: "wallet::connect", connector = %uid, id = connector.id(), "registering connector");

        let id = Self::attach_connect_listener(&self.store, &connector);
        let replaced = self.store.replace_subscriptions(uid, vec![(EventKind::Connect, id)]);
        for (kind, listener) in replaced {
            connector.emitter().off(kind, listener);
        }

        self.connectors.lock().push(connector.clone());
        connector
    }

    /// Attaches the store's default `connect` event sink to a connector.
    pub(crate) fn attach_connect_listener(
        store: &ConnectionStore,
        connector: &Arc<dyn Connector>,
    ) -> crate::events::ListenerId {
        let store = store.clone();
        // Weak reference: the emitter lives inside the connector, a strong
        // handler capture would cycle.
        let weak: Weak<dyn Connector> = Arc::downgrade(connector);
        connector.emitter().on(
            EventKind::Connect,
            Arc::new(move |event| {
                if let ConnectorEvent::Connect { accounts, chain_id } = event
                    && let Some(connector) = weak.upgrade()
                {
                    store.apply_connect(connector, accounts.clone(), *chain_id);
                }
            }),
        )
    }

    /// Resolves an action's connector argument, registering factories first.
    pub(crate) fn resolve_connector(&self, param: ConnectorParam) -> Arc<dyn Connector> {
        match param {
            ConnectorParam::Connector(connector) => connector,
            ConnectorParam::Factory(create) => self.setup(create()),
        }
    }

    /// Persists the most recently used connector identifier.
    pub(crate) fn set_recent_connector(&self, id: &str) -> Result<(), StorageError> {
        match &self.storage {
            Some(storage) => storage.set_recent_connector_id(id),
            None => Ok(()),
        }
    }

    /// Best-effort removal of the persisted connector identifier.
    pub(crate) fn clear_recent_connector(&self) {
        if let Some(storage) = &self.storage {
            storage.remove_recent_connector_id();
            debug!(target: "wallet::connect", "cleared recent connector id");
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("store", &self.store)
            .field("chains", &self.chains)
            .field("connectors", &self.connectors.lock().len())
            .finish()
    }
}
