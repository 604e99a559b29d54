//! # Wallet connection orchestration
//!
//! Client-side lifecycle management for a wallet connection: the connection
//! state machine (`disconnected -> connecting -> connected`), the connector
//! abstraction it drives, and the typed RPC calls it issues through
//! [`wallet_rpc`].
//!
//! ## Architecture
//!
//! - [`ConnectionStore`]: process-wide connection state with atomic
//!   whole-state replacement; at most one connector is current at a time.
//! - [`Connector`]: external handle to a wallet backend, able to produce a
//!   [`Transport`](wallet_rpc::Transport) and emitting lifecycle events
//!   through its [`Emitter`].
//! - [`actions`]: the orchestrator: establishing actions (`connect`,
//!   `create_account`, `upgrade_account`) that commit a new connection or
//!   roll back, `disconnect`, and the permission/admin queries.
//!
//! Every action takes an explicit [`Config`]; no hidden module state.

pub mod actions;
mod config;
mod connector;
mod error;
mod events;
mod state;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{ChainDef, Config, MemoryStorage, Storage};
pub use connector::{Connector, ConnectorConnectRequest, ConnectorData, ConnectorParam, CreateConnectorFn};
pub use error::{ConnectError, StorageError};
pub use events::{ConnectorEvent, ConnectorMessage, Emitter, EventHandler, EventKind, ListenerId};
pub use state::{Connection, ConnectionState, ConnectionStatus, ConnectionStore};
