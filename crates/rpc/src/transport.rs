use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::{RpcError, WalletMethod, WalletRpc, codec};

/// Request/response channel to a connected wallet provider.
///
/// The adapter is owned externally; it may suspend for unbounded time (user
/// interaction, network latency) and carries no timeout of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers one RPC request and awaits the raw response.
    async fn request(&self, method: WalletMethod, params: Value) -> Result<Value, crate::TransportError>;
}

/// Issues a single typed request: encode, deliver, validate.
pub async fn request<M: WalletRpc>(
    transport: &dyn Transport,
    params: &M::Params,
) -> Result<M::Response, RpcError> {
    let wire = codec::encode_params::<M>(params)?;
    trace!(target: "wallet::rpc", method = %M::METHOD, "sending wallet RPC request");
    let response = transport.request(M::METHOD, wire).await?;
    Ok(codec::decode_response::<M>(response)?)
}
