//! Connection orchestrator actions.
//!
//! Establishing actions ([`connect`], [`create_account`], [`upgrade_account`])
//! drive the store through `connecting` into `connected`, or roll back on any
//! failure without destroying an unrelated established connection.
//! [`disconnect`] tears local state down first and only then notifies the
//! provider best-effort. The query/admin actions issue exactly one typed
//! request each and do not touch connection state.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, ChainId};
use alloy_signer::Signer;
use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, trace};
use wallet_rpc::{
    Transport, methods, request,
    capabilities::{
        ConnectCapabilities, FeeToken, FeeTokenCapabilities, Key, Permission, PermissionsRequest,
        UpgradeCapabilities,
    },
    types,
};

use crate::{
    config::Config,
    connector::{Connector, ConnectorConnectRequest, ConnectorData, ConnectorParam},
    error::ConnectError,
    events::{ConnectorEvent, ConnectorMessage, EventKind},
    state::{Connection, ConnectionState, ConnectionStatus},
};

/// Parameters of [`connect`].
#[derive(Clone, Debug)]
pub struct ConnectParameters {
    pub connector: ConnectorParam,
    pub chain_id: Option<ChainId>,
    /// Bypasses the already-connected guard, allowing a reconnect of the
    /// current connector.
    pub force: bool,
    pub capabilities: ConnectCapabilities,
}

impl ConnectParameters {
    pub fn new(connector: impl Into<ConnectorParam>) -> Self {
        Self {
            connector: connector.into(),
            chain_id: None,
            force: false,
            capabilities: ConnectCapabilities::default(),
        }
    }
}

/// Establishes a connection through `wallet_connect`.
pub async fn connect(
    config: &Config,
    parameters: ConnectParameters,
) -> Result<ConnectorData, ConnectError> {
    let ConnectParameters { connector, chain_id, force, capabilities } = parameters;
    let connector = config.resolve_connector(connector);
    guard_establish(config, &connector, chain_id, force)?;

    begin_establish(config, &connector);
    let result = async {
        let provider = provider_of(&connector).await?;
        request::<methods::Connect>(provider.as_ref(), &types::ConnectParameters { capabilities })
            .await?;
        finish_establish(config, &connector, chain_id).await
    }
    .await;
    result.map_err(|err| rollback(config, err))
}

/// Parameters of [`create_account`].
#[derive(Clone, Debug)]
pub struct CreateAccountParameters {
    pub connector: ConnectorParam,
    pub chain_id: Option<ChainId>,
    pub label: Option<String>,
}

impl CreateAccountParameters {
    pub fn new(connector: impl Into<ConnectorParam>) -> Self {
        Self { connector: connector.into(), chain_id: None, label: None }
    }
}

/// Creates a wallet account through `wallet_createAccount` and establishes a
/// connection to it.
///
/// Unlike [`connect`], there is no force bypass: re-targeting the current
/// connector always fails with [`ConnectError::AlreadyConnected`].
pub async fn create_account(
    config: &Config,
    parameters: CreateAccountParameters,
) -> Result<ConnectorData, ConnectError> {
    let CreateAccountParameters { connector, chain_id, label } = parameters;
    let connector = config.resolve_connector(connector);
    guard_establish(config, &connector, chain_id, false)?;

    begin_establish(config, &connector);
    let result = async {
        let provider = provider_of(&connector).await?;
        request::<methods::CreateAccount>(
            provider.as_ref(),
            &types::CreateAccountParameters { label },
        )
        .await?;
        finish_establish(config, &connector, chain_id).await
    }
    .await;
    result.map_err(|err| rollback(config, err))
}

/// Parameters of [`upgrade_account`].
#[derive(Clone, Debug)]
pub struct UpgradeAccountParameters<S> {
    pub connector: ConnectorParam,
    /// Local account whose signing capability covers the prepared payloads.
    pub account: S,
    pub chain_id: Option<ChainId>,
    pub fee_token: Option<FeeToken>,
    pub grant_permissions: Option<PermissionsRequest>,
    pub label: Option<String>,
}

impl<S> UpgradeAccountParameters<S> {
    pub fn new(connector: impl Into<ConnectorParam>, account: S) -> Self {
        Self {
            connector: connector.into(),
            account,
            chain_id: None,
            fee_token: None,
            grant_permissions: None,
            label: None,
        }
    }
}

/// Upgrades an existing account through the two-phase
/// `wallet_prepareUpgradeAccount` / `wallet_upgradeAccount` flow and
/// establishes a connection to it.
///
/// Every prepared payload is signed concurrently; a single signing failure
/// aborts the action before any `wallet_upgradeAccount` request is sent.
pub async fn upgrade_account<S>(
    config: &Config,
    parameters: UpgradeAccountParameters<S>,
) -> Result<ConnectorData, ConnectError>
where
    S: Signer + Send + Sync,
{
    let UpgradeAccountParameters { connector, account, chain_id, fee_token, grant_permissions, label } =
        parameters;
    let connector = config.resolve_connector(connector);
    guard_establish(config, &connector, chain_id, false)?;

    begin_establish(config, &connector);
    let result = async {
        let provider = provider_of(&connector).await?;
        let prepared = request::<methods::PrepareUpgradeAccount>(
            provider.as_ref(),
            &types::PrepareUpgradeAccountParameters {
                address: account.address(),
                capabilities: UpgradeCapabilities { fee_token, grant_permissions },
                label,
            },
        )
        .await?;

        trace!(
            target: "wallet::connect",
            payloads = prepared.sign_payloads.len(),
            "signing upgrade payloads"
        );
        let signatures =
            try_join_all(prepared.sign_payloads.iter().map(|payload| account.sign_hash(payload)))
                .await?;
        let signatures = signatures
            .into_iter()
            .map(|signature| Bytes::from(signature.as_bytes().to_vec()))
            .collect();

        request::<methods::UpgradeAccount>(
            provider.as_ref(),
            &types::UpgradeAccountParameters { context: prepared.context, signatures },
        )
        .await?;
        finish_establish(config, &connector, chain_id).await
    }
    .await;
    result.map_err(|err| rollback(config, err))
}

/// Parameters of [`disconnect`].
#[derive(Clone, Default)]
pub struct DisconnectParameters {
    /// Target connector; defaults to the current connection's connector.
    pub connector: Option<Arc<dyn Connector>>,
}

/// Disconnects a connector: local teardown first, then a best-effort
/// `wallet_disconnect` notification whose failure is discarded.
pub async fn disconnect(
    config: &Config,
    parameters: DisconnectParameters,
) -> Result<(), ConnectError> {
    let connector = parameters.connector.or_else(|| {
        config.store().state().current_connection().map(|connection| connection.connector.clone())
    });

    let provider = match &connector {
        Some(connector) => connector.provider().await,
        None => None,
    };

    if let Some(connector) = &connector {
        teardown(config, connector).await?;
    }

    if let Some(provider) = provider {
        // Local teardown already succeeded; a failed notification must not
        // make the disconnect appear to fail.
        if let Err(err) = request::<methods::Disconnect>(provider.as_ref(), &()).await {
            debug!(target: "wallet::connect", %err, "wallet_disconnect notification failed, ignoring");
        }
    }
    Ok(())
}

/// Query parameters shared by [`get_admins`] and [`get_permissions`].
#[derive(Clone, Default)]
pub struct QueryParameters {
    pub address: Option<Address>,
    /// Target connector; defaults to the current connection's connector.
    pub connector: Option<Arc<dyn Connector>>,
}

/// Fetches the admin keys of an account via `wallet_getAdmins`.
pub async fn get_admins(
    config: &Config,
    parameters: QueryParameters,
) -> Result<types::GetAdminsResponse, ConnectError> {
    let client = connector_client(config, parameters.connector).await?;
    Ok(request::<methods::GetAdmins>(
        client.as_ref(),
        &types::AccountParameters { address: parameters.address },
    )
    .await?)
}

/// Fetches the permission grants of an account via `wallet_getPermissions`.
pub async fn get_permissions(
    config: &Config,
    parameters: QueryParameters,
) -> Result<Vec<Permission>, ConnectError> {
    let client = connector_client(config, parameters.connector).await?;
    Ok(request::<methods::GetPermissions>(
        client.as_ref(),
        &types::AccountParameters { address: parameters.address },
    )
    .await?)
}

/// Parameters of [`grant_admin`].
#[derive(Clone)]
pub struct GrantAdminParameters {
    pub address: Option<Address>,
    pub connector: Option<Arc<dyn Connector>>,
    pub fee_token: Option<FeeToken>,
    /// Key to promote to admin.
    pub key: Key,
}

/// Grants admin rights to a key via `wallet_grantAdmin`.
pub async fn grant_admin(
    config: &Config,
    parameters: GrantAdminParameters,
) -> Result<types::GrantAdminResponse, ConnectError> {
    let GrantAdminParameters { address, connector, fee_token, key } = parameters;
    let client = connector_client(config, connector).await?;
    Ok(request::<methods::GrantAdmin>(
        client.as_ref(),
        &types::GrantAdminParameters {
            address,
            capabilities: fee_token.map(|fee_token| FeeTokenCapabilities { fee_token: Some(fee_token) }),
            key,
        },
    )
    .await?)
}

/// Parameters of [`grant_permissions`].
#[derive(Clone)]
pub struct GrantPermissionsParameters {
    pub address: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub connector: Option<Arc<dyn Connector>>,
    pub request: PermissionsRequest,
}

/// Grants permissions to a key via `wallet_grantPermissions`.
pub async fn grant_permissions(
    config: &Config,
    parameters: GrantPermissionsParameters,
) -> Result<Permission, ConnectError> {
    let GrantPermissionsParameters { address, chain_id, connector, request: body } = parameters;
    let client = connector_client(config, connector).await?;
    Ok(request::<methods::GrantPermissions>(
        client.as_ref(),
        &types::GrantPermissionsParameters { address, chain_id, request: body },
    )
    .await?)
}

/// Parameters of [`revoke_admin`] and [`revoke_permissions`].
#[derive(Clone)]
pub struct RevokeParameters {
    pub address: Option<Address>,
    pub connector: Option<Arc<dyn Connector>>,
    pub fee_token: Option<FeeToken>,
    /// Identifier of the grant to revoke.
    pub id: Bytes,
}

/// Revokes an admin key via `wallet_revokeAdmin`. The result is opaque.
pub async fn revoke_admin(
    config: &Config,
    parameters: RevokeParameters,
) -> Result<Value, ConnectError> {
    let RevokeParameters { address, connector, fee_token, id } = parameters;
    let client = connector_client(config, connector).await?;
    Ok(request::<methods::RevokeAdmin>(
        client.as_ref(),
        &types::RevokeParameters { address, capabilities: FeeTokenCapabilities { fee_token }, id },
    )
    .await?)
}

/// Revokes a permission grant via `wallet_revokePermissions`. The result is
/// opaque.
pub async fn revoke_permissions(
    config: &Config,
    parameters: RevokeParameters,
) -> Result<Value, ConnectError> {
    let RevokeParameters { address, connector, fee_token, id } = parameters;
    let client = connector_client(config, connector).await?;
    Ok(request::<methods::RevokePermissions>(
        client.as_ref(),
        &types::RevokeParameters { address, capabilities: FeeTokenCapabilities { fee_token }, id },
    )
    .await?)
}

/// Preconditions of an establishing action, checked against a point-in-time
/// snapshot (not a lock; see the store's concurrency contract).
fn guard_establish(
    config: &Config,
    connector: &Arc<dyn Connector>,
    chain_id: Option<ChainId>,
    force: bool,
) -> Result<(), ConnectError> {
    let state = config.store().state();
    if state.current == Some(connector.uid()) && !force {
        return Err(ConnectError::AlreadyConnected);
    }
    if let Some(requested) = chain_id
        && requested != state.chain_id
    {
        return Err(config.chain_mismatch(requested, state.chain_id));
    }
    Ok(())
}

/// Enters the `connecting` phase before any network I/O, so observers see it
/// for the whole duration of the request.
fn begin_establish(config: &Config, connector: &Arc<dyn Connector>) {
    config.store().set_state(|state| ConnectionState {
        status: ConnectionStatus::Connecting,
        ..state.clone()
    });
    connector.emitter().emit(&ConnectorEvent::Message(ConnectorMessage::Connecting));
}

async fn provider_of(connector: &Arc<dyn Connector>) -> Result<Arc<dyn Transport>, ConnectError> {
    connector.provider().await.ok_or(ConnectError::ProviderUnavailable)
}

/// Steps shared by every establishing action once its wire handshake
/// succeeded: re-arm the connector session, rewire listeners, persist the
/// recent connector id, and commit the connection as current.
async fn finish_establish(
    config: &Config,
    connector: &Arc<dyn Connector>,
    chain_id: Option<ChainId>,
) -> Result<ConnectorData, ConnectError> {
    // The wire handshake already happened; this re-arms the connector's
    // internal event wiring without re-prompting the user.
    let data =
        connector.connect(ConnectorConnectRequest { chain_id, is_reconnecting: true }).await?;

    rewire_listeners(config, connector);
    config.set_recent_connector(connector.id())?;

    let uid = connector.uid();
    config.store().set_state(|state| {
        let mut connections = state.connections.clone();
        connections.insert(
            uid,
            Connection {
                accounts: data.accounts.clone(),
                chain_id: data.chain_id,
                connector: connector.clone(),
            },
        );
        ConnectionState {
            status: ConnectionStatus::Connected,
            chain_id: state.chain_id,
            current: Some(uid),
            connections,
        }
    });
    debug!(
        target: "wallet::connect",
        connector = %uid,
        chain = data.chain_id,
        accounts = data.accounts.len(),
        "connection established"
    );
    Ok(data)
}

/// Replaces the connector's listener set: the default `connect` listener is
/// superseded, `change` and `disconnect` funnel into the store.
fn rewire_listeners(config: &Config, connector: &Arc<dyn Connector>) {
    let uid = connector.uid();
    let emitter = connector.emitter();

    let store = config.store().clone();
    let change = emitter.on(
        EventKind::Change,
        Arc::new(move |event| {
            if let ConnectorEvent::Change { accounts, chain_id } = event {
                store.apply_change(uid, accounts.clone(), *chain_id);
            }
        }),
    );
    let store = config.store().clone();
    let disconnected = emitter.on(
        EventKind::Disconnect,
        Arc::new(move |event| {
            if matches!(event, ConnectorEvent::Disconnect) {
                store.apply_disconnect(uid);
            }
        }),
    );

    // Attach-then-detach keeps the channel covered across the swap.
    let replaced = config.store().replace_subscriptions(
        uid,
        vec![(EventKind::Change, change), (EventKind::Disconnect, disconnected)],
    );
    for (kind, listener) in replaced {
        emitter.off(kind, listener);
    }
}

/// Restores the store after a failed establishing action: an unrelated
/// current connection stays connected, otherwise the store goes back to
/// `disconnected`. The original error is re-raised unchanged.
fn rollback(config: &Config, err: ConnectError) -> ConnectError {
    config.store().set_state(|state| ConnectionState {
        status: if state.current.is_some() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        },
        ..state.clone()
    });
    err
}

/// Local teardown of a connector: close its session, detach our listeners,
/// drop its store entry, and re-arm the default `connect` listener so the
/// connector can come back.
async fn teardown(config: &Config, connector: &Arc<dyn Connector>) -> Result<(), ConnectError> {
    connector.disconnect().await?;

    let uid = connector.uid();
    for (kind, listener) in config.store().take_subscriptions(uid) {
        connector.emitter().off(kind, listener);
    }
    config.store().apply_disconnect(uid);

    let listener = Config::attach_connect_listener(config.store(), connector);
    config.store().replace_subscriptions(uid, vec![(EventKind::Connect, listener)]);

    // Keep the persisted recent-connector id in sync, best-effort.
    match config.store().state().current_connection() {
        Some(connection) => {
            if let Err(err) = config.set_recent_connector(connection.connector.id()) {
                debug!(target: "wallet::connect", %err, "failed to update recent connector id");
            }
        }
        None => config.clear_recent_connector(),
    }
    Ok(())
}

/// Resolves a request-capable client for the query/admin actions.
async fn connector_client(
    config: &Config,
    connector: Option<Arc<dyn Connector>>,
) -> Result<Arc<dyn Transport>, ConnectError> {
    let connector = match connector {
        Some(connector) => connector,
        None => config
            .store()
            .state()
            .current_connection()
            .map(|connection| connection.connector.clone())
            .ok_or(ConnectError::NotConnected)?,
    };
    provider_of(&connector).await
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{B256, U256, address};
    use alloy_signer::{Signature, Signer};
    use alloy_signer_local::PrivateKeySigner;
    use async_trait::async_trait;
    use serde_json::json;
    use similar_asserts::assert_eq;
    use wallet_rpc::{
        TransportError, WalletMethod,
        capabilities::{KeyType, Permissions, SpendPeriod, SpendPermission},
    };

    use super::*;
    use crate::{
        config::{ChainDef, MemoryStorage, Storage},
        error::StorageError,
        test_utils::{ALICE, BOB, MockConnector, connect_response},
    };

    fn test_config() -> (Config, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let config =
            Config::new(vec![ChainDef::new(1, "Mainnet")]).with_storage(storage.clone());
        (config, storage)
    }

    #[tokio::test]
    async fn connect_establishes_a_connection() {
        let (config, storage) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));

        let data = connect(
            &config,
            ConnectParameters { chain_id: Some(1), ..ConnectParameters::new(connector.clone() as Arc<dyn Connector>) },
        )
        .await
        .unwrap();

        assert_eq!(data, ConnectorData { accounts: vec![ALICE], chain_id: 1 });

        let state = config.store().state();
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.current, Some(connector.uid()));
        let connection = &state.connections[&connector.uid()];
        assert_eq!(connection.accounts, vec![ALICE]);
        assert_eq!(connection.chain_id, 1);

        assert_eq!(storage.recent_connector_id().as_deref(), Some("mock-1"));
        assert_eq!(connector.transport().calls_for(WalletMethod::Connect), 1);
        // The session re-arm went through the connector exactly once.
        assert_eq!(connector.connect_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_emits_connecting_before_the_request() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));

        let statuses = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = statuses.clone();
        let store = config.store().clone();
        connector.emitter().on(
            EventKind::Message,
            Arc::new(move |event| {
                if matches!(event, ConnectorEvent::Message(ConnectorMessage::Connecting)) {
                    seen.lock().push(store.status());
                }
            }),
        );

        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        // The connecting transition is visible when the message fires.
        assert_eq!(*statuses.lock(), vec![ConnectionStatus::Connecting]);
    }

    #[tokio::test]
    async fn connect_twice_requires_force() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));

        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        let err = connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::AlreadyConnected));
        assert_eq!(connector.transport().calls_for(WalletMethod::Connect), 1);

        connect(
            &config,
            ConnectParameters {
                force: true,
                ..ConnectParameters::new(connector.clone() as Arc<dyn Connector>)
            },
        )
        .await
        .unwrap();
        assert_eq!(connector.transport().calls_for(WalletMethod::Connect), 2);
        assert_eq!(config.store().status(), ConnectionStatus::Connected);
        // Reconnects replace the listener set instead of stacking it.
        assert_eq!(connector.emitter().listener_count(EventKind::Change), 1);
        assert_eq!(connector.emitter().listener_count(EventKind::Disconnect), 1);
    }

    #[tokio::test]
    async fn chain_mismatch_fails_before_any_request() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);

        let err = connect(
            &config,
            ConnectParameters {
                chain_id: Some(10),
                ..ConnectParameters::new(connector.clone() as Arc<dyn Connector>)
            },
        )
        .await
        .unwrap_err();

        match err {
            ConnectError::ChainMismatch { requested, requested_id, current_id } => {
                // 10 is not in the configured chain list: synthetic label.
                assert_eq!(requested, "Chain 10");
                assert_eq!(requested_id, 10);
                assert_eq!(current_id, 1);
            }
            other => panic!("expected chain mismatch, got {other:?}"),
        }
        assert!(connector.transport().calls().is_empty());
        assert_eq!(config.store().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn failed_connect_rolls_back_to_disconnected() {
        let (config, storage) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector.transport().fail(WalletMethod::Connect, "user rejected the request");

        let err = connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap_err();

        // The transport failure is passed through unchanged.
        match err {
            ConnectError::Transport(TransportError { message }) => {
                assert_eq!(message, "user rejected the request");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
        let state = config.store().state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.connections.is_empty());
        assert_eq!(storage.recent_connector_id(), None);
    }

    #[tokio::test]
    async fn failed_connect_keeps_an_unrelated_connection() {
        let (config, _) = test_config();
        let first = MockConnector::online("mock-1", 1);
        first.transport().respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(first.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        let second = MockConnector::online("mock-2", 1);
        second.transport().fail(WalletMethod::Connect, "backend offline");
        connect(&config, ConnectParameters::new(second.clone() as Arc<dyn Connector>))
            .await
            .unwrap_err();

        let state = config.store().state();
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.current, Some(first.uid()));
        assert_eq!(state.connections.len(), 1);
    }

    #[tokio::test]
    async fn missing_provider_is_reported_and_rolled_back() {
        let (config, _) = test_config();
        let connector = MockConnector::offline("mock-1");

        let err = connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::ProviderUnavailable));
        assert_eq!(config.store().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn storage_failure_rolls_back_the_connect() {
        struct FailingStorage;
        impl Storage for FailingStorage {
            fn set_recent_connector_id(&self, _id: &str) -> Result<(), StorageError> {
                Err(StorageError::new("disk full"))
            }
            fn recent_connector_id(&self) -> Option<String> {
                None
            }
            fn remove_recent_connector_id(&self) {}
        }

        let config =
            Config::new(vec![ChainDef::new(1, "Mainnet")]).with_storage(Arc::new(FailingStorage));
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));

        let err = connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::Storage(_)));
        assert_eq!(config.store().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn create_account_sends_the_label() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::CreateAccount, connect_response(&[BOB], 1));

        let data = create_account(
            &config,
            CreateAccountParameters {
                label: Some("personal".into()),
                ..CreateAccountParameters::new(connector.clone() as Arc<dyn Connector>)
            },
        )
        .await
        .unwrap();
        assert_eq!(data.chain_id, 1);

        let calls = connector.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, WalletMethod::CreateAccount);
        assert_eq!(calls[0].1, json!([{ "label": "personal" }]));
    }

    #[tokio::test]
    async fn create_account_never_retargets_the_current_connector() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        // No force bypass exists for create_account.
        let err = create_account(
            &config,
            CreateAccountParameters::new(connector.clone() as Arc<dyn Connector>),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConnectError::AlreadyConnected));
    }

    fn prepared_upgrade_response(payloads: &[B256]) -> serde_json::Value {
        json!({
            "context": { "account": ALICE, "nonce": 7 },
            "signPayloads": payloads,
        })
    }

    #[tokio::test]
    async fn upgrade_account_signs_every_payload_in_order() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        let payloads = [B256::repeat_byte(0x11), B256::repeat_byte(0x22)];
        connector
            .transport()
            .respond(WalletMethod::PrepareUpgradeAccount, prepared_upgrade_response(&payloads));

        let account = PrivateKeySigner::from_bytes(&B256::from(U256::from(7u64))).unwrap();
        let expected: Vec<Bytes> = futures::future::join_all(
            payloads.iter().map(|payload| account.sign_hash(payload)),
        )
        .await
        .into_iter()
        .map(|signature| Bytes::from(signature.unwrap().as_bytes().to_vec()))
        .collect();

        upgrade_account(
            &config,
            UpgradeAccountParameters::new(connector.clone() as Arc<dyn Connector>, account),
        )
        .await
        .unwrap();

        let calls = connector.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, WalletMethod::PrepareUpgradeAccount);
        assert_eq!(calls[1].0, WalletMethod::UpgradeAccount);
        // Context is echoed back and signatures follow payload order.
        assert_eq!(calls[1].1[0]["context"], json!({ "account": ALICE, "nonce": 7 }));
        assert_eq!(calls[1].1[0]["signatures"], serde_json::to_value(&expected).unwrap());
        assert_eq!(config.store().status(), ConnectionStatus::Connected);
    }

    /// Signer whose signing capability always refuses.
    struct RefusingSigner;

    #[async_trait]
    impl Signer for RefusingSigner {
        async fn sign_hash(&self, _hash: &B256) -> alloy_signer::Result<Signature> {
            Err(alloy_signer::Error::other("signing refused"))
        }

        fn address(&self) -> Address {
            ALICE
        }

        fn chain_id(&self) -> Option<ChainId> {
            None
        }

        fn set_chain_id(&mut self, _chain_id: Option<ChainId>) {}
    }

    #[tokio::test]
    async fn upgrade_account_aborts_when_signing_fails() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector.transport().respond(
            WalletMethod::PrepareUpgradeAccount,
            prepared_upgrade_response(&[B256::repeat_byte(0x11), B256::repeat_byte(0x22)]),
        );

        let err = upgrade_account(
            &config,
            UpgradeAccountParameters::new(connector.clone() as Arc<dyn Connector>, RefusingSigner),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ConnectError::Signer(_)));
        // No upgrade request goes out and the store is unchanged.
        assert_eq!(connector.transport().calls_for(WalletMethod::UpgradeAccount), 0);
        let state = config.store().state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.connections.is_empty());
    }

    #[tokio::test]
    async fn disconnect_resets_the_store_despite_notification_failure() {
        let (config, storage) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        connector.transport().fail(WalletMethod::Disconnect, "connection reset");

        disconnect(&config, DisconnectParameters::default()).await.unwrap();

        let state = config.store().state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.current, None);
        assert!(state.connections.is_empty());
        // The notification was attempted (and its failure discarded).
        assert_eq!(connector.transport().calls_for(WalletMethod::Disconnect), 1);
        assert_eq!(
            connector.disconnect_calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
        assert_eq!(storage.recent_connector_id(), None);
    }

    #[tokio::test]
    async fn disconnect_without_a_connection_is_a_noop() {
        let (config, _) = test_config();
        disconnect(&config, DisconnectParameters::default()).await.unwrap();
        assert_eq!(config.store().status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn change_and_disconnect_events_flow_into_the_store() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        connector.emitter().emit(&ConnectorEvent::Change {
            accounts: Some(vec![BOB]),
            chain_id: None,
        });
        assert_eq!(
            config.store().state().connections[&connector.uid()].accounts,
            vec![BOB]
        );

        connector.emitter().emit(&ConnectorEvent::Disconnect);
        let state = config.store().state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.connections.is_empty());
    }

    #[tokio::test]
    async fn get_permissions_rejects_a_malformed_response() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();
        let state_before = config.store().state();

        // Permission records require id, key and permissions.
        connector.transport().respond(
            WalletMethod::GetPermissions,
            json!([{ "address": ALICE, "expiry": 1_735_689_600u64 }]),
        );

        let err = get_permissions(&config, QueryParameters::default()).await.unwrap_err();
        match err {
            ConnectError::Decoding(err) => {
                let message = err.to_string();
                assert!(message.contains("wallet_getPermissions"), "{message}");
                assert!(message.contains("missing field"), "{message}");
            }
            other => panic!("expected decoding error, got {other:?}"),
        }

        // Query failures never mutate connection state.
        let state_after = config.store().state();
        assert_eq!(state_after.status, state_before.status);
        assert_eq!(state_after.current, state_before.current);
        assert_eq!(state_after.connections.len(), state_before.connections.len());
    }

    #[tokio::test]
    async fn queries_require_a_connection() {
        let (config, _) = test_config();
        let err = get_admins(&config, QueryParameters::default()).await.unwrap_err();
        assert!(matches!(err, ConnectError::NotConnected));
    }

    #[tokio::test]
    async fn grant_permissions_roundtrips_the_grant() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        let key = Key {
            public_key: Bytes::from(vec![0xaa; 33]),
            kind: KeyType::P256,
        };
        let granted = Permission {
            address: ALICE,
            chain_id: Some(1),
            expiry: 1_735_689_600,
            id: Bytes::from(vec![0x42]),
            key: key.clone(),
            permissions: Permissions {
                calls: vec![],
                spend: vec![SpendPermission {
                    limit: U256::from(500u64),
                    period: SpendPeriod::Week,
                    token: None,
                }],
            },
        };
        connector
            .transport()
            .respond(WalletMethod::GrantPermissions, serde_json::to_value(&granted).unwrap());

        let response = grant_permissions(
            &config,
            GrantPermissionsParameters {
                address: Some(ALICE),
                chain_id: None,
                connector: None,
                request: PermissionsRequest {
                    expiry: 1_735_689_600,
                    fee_token: None,
                    key: Some(key),
                    permissions: granted.permissions.clone(),
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(response, granted);
        // Queries leave the connection as-is.
        assert_eq!(config.store().status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn revoke_admin_sends_the_fee_token_capability() {
        let (config, _) = test_config();
        let connector = MockConnector::online("mock-1", 1);
        connector
            .transport()
            .respond(WalletMethod::Connect, connect_response(&[ALICE], 1));
        connect(&config, ConnectParameters::new(connector.clone() as Arc<dyn Connector>))
            .await
            .unwrap();

        let token = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        revoke_admin(
            &config,
            RevokeParameters {
                address: Some(ALICE),
                connector: None,
                fee_token: Some(FeeToken::Address(token)),
                id: Bytes::from(vec![0xbe, 0xef]),
            },
        )
        .await
        .unwrap();

        let calls = connector.transport().calls();
        let revoke = calls.iter().find(|(method, _)| *method == WalletMethod::RevokeAdmin).unwrap();
        assert_eq!(
            revoke.1,
            json!([{
                "address": ALICE,
                "capabilities": { "feeToken": token },
                "id": "0xbeef",
            }])
        );
    }
}
