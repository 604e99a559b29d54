//! Shared mocks: a scripted transport recording every request and a
//! connector wired to it.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use alloy_primitives::{Address, ChainId, address};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;
use wallet_rpc::{Transport, TransportError, WalletMethod};

use crate::{
    connector::{Connector, ConnectorConnectRequest, ConnectorData},
    events::Emitter,
};

pub(crate) const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub(crate) const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

/// Scripted [`Transport`]: every request is recorded, responses are staged
/// per method. Unscripted methods answer `null`.
#[derive(Default)]
pub(crate) struct MockTransport {
    calls: Mutex<Vec<(WalletMethod, Value)>>,
    responses: Mutex<HashMap<WalletMethod, Result<Value, String>>>,
}

impl MockTransport {
    pub(crate) fn respond(&self, method: WalletMethod, response: Value) {
        self.responses.lock().insert(method, Ok(response));
    }

    pub(crate) fn fail(&self, method: WalletMethod, message: &str) {
        self.responses.lock().insert(method, Err(message.to_string()));
    }

    pub(crate) fn calls(&self) -> Vec<(WalletMethod, Value)> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_for(&self, method: WalletMethod) -> usize {
        self.calls.lock().iter().filter(|(called, _)| *called == method).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, method: WalletMethod, params: Value) -> Result<Value, TransportError> {
        self.calls.lock().push((method, params));
        match self.responses.lock().get(&method) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(TransportError::new(message.clone())),
            None => Ok(Value::Null),
        }
    }
}

/// A wire-conforming `wallet_connect`/`wallet_createAccount` response for the
/// given accounts.
pub(crate) fn connect_response(accounts: &[Address], chain_id: ChainId) -> Value {
    json!({
        "accounts": accounts.iter().map(|address| json!({ "address": address })).collect::<Vec<_>>(),
        "chainIds": [chain_id],
    })
}

/// Mock wallet backend handle.
pub(crate) struct MockConnector {
    uid: Uuid,
    id: String,
    chain_id: ChainId,
    accounts: Vec<Address>,
    emitter: Emitter,
    transport: Option<Arc<MockTransport>>,
    pub(crate) connect_calls: AtomicUsize,
    pub(crate) disconnect_calls: AtomicUsize,
}

impl MockConnector {
    pub(crate) fn online(id: &str, chain_id: ChainId) -> Arc<Self> {
        Self::with_accounts(id, chain_id, vec![ALICE])
    }

    pub(crate) fn with_accounts(id: &str, chain_id: ChainId, accounts: Vec<Address>) -> Arc<Self> {
        Arc::new(Self {
            uid: Uuid::new_v4(),
            id: id.to_string(),
            chain_id,
            accounts,
            emitter: Emitter::new(),
            transport: Some(Arc::new(MockTransport::default())),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        })
    }

    /// A connector whose backend produces no transport.
    pub(crate) fn offline(id: &str) -> Arc<Self> {
        Arc::new(Self {
            uid: Uuid::new_v4(),
            id: id.to_string(),
            chain_id: 1,
            accounts: vec![ALICE],
            emitter: Emitter::new(),
            transport: None,
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn transport(&self) -> Arc<MockTransport> {
        self.transport.clone().expect("mock connector has no transport")
    }

    pub(crate) fn accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn uid(&self) -> Uuid {
        self.uid
    }

    fn id(&self) -> &str {
        &self.id
    }

    async fn provider(&self) -> Option<Arc<dyn Transport>> {
        self.transport.clone().map(|transport| transport as Arc<dyn Transport>)
    }

    async fn connect(
        &self,
        request: ConnectorConnectRequest,
    ) -> Result<ConnectorData, TransportError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ConnectorData {
            accounts: self.accounts.clone(),
            chain_id: request.chain_id.unwrap_or(self.chain_id),
        })
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}
