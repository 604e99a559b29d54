use std::{fmt, sync::Arc};

use alloy_primitives::{Address, ChainId};
use async_trait::async_trait;
use uuid::Uuid;
use wallet_rpc::{Transport, TransportError};

use crate::events::Emitter;

/// Request passed to [`Connector::connect`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ConnectorConnectRequest {
    pub chain_id: Option<ChainId>,
    /// Set when the wire-level handshake already happened and the call only
    /// (re)arms the connector's internal event wiring without re-prompting
    /// the user.
    pub is_reconnecting: bool,
}

/// Accounts and chain a connector session resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorData {
    /// Ordered account list; non-empty for an established session.
    pub accounts: Vec<Address>,
    pub chain_id: ChainId,
}

/// External handle to a wallet backend.
///
/// Owned outside the orchestrator, which only holds a reference plus listener
/// registrations on the [`Emitter`].
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stable identifier of this connector instance.
    fn uid(&self) -> Uuid;

    /// Connector kind identifier, persisted as the most recent connector.
    fn id(&self) -> &str;

    /// Produces the transport to the backing provider, if one is available.
    async fn provider(&self) -> Option<Arc<dyn Transport>>;

    /// Establishes (or re-arms) the connector session.
    async fn connect(
        &self,
        request: ConnectorConnectRequest,
    ) -> Result<ConnectorData, TransportError>;

    /// Tears down the connector session.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Lifecycle event channel of this connector.
    fn emitter(&self) -> &Emitter;
}

/// Factory producing a connector instance on registration.
pub type CreateConnectorFn = Arc<dyn Fn() -> Arc<dyn Connector> + Send + Sync>;

/// Connector argument of the establishing actions: an existing instance, or a
/// factory the config registers first.
#[derive(Clone)]
pub enum ConnectorParam {
    Connector(Arc<dyn Connector>),
    Factory(CreateConnectorFn),
}

impl From<Arc<dyn Connector>> for ConnectorParam {
    fn from(connector: Arc<dyn Connector>) -> Self {
        Self::Connector(connector)
    }
}

impl fmt::Debug for ConnectorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connector(connector) => {
                f.debug_tuple("Connector").field(&connector.uid()).finish()
            }
            Self::Factory(_) => f.debug_tuple("Factory").finish(),
        }
    }
}
