use alloy_primitives::ChainId;
use wallet_rpc::{DecodingError, EncodingError, RpcError, TransportError};

/// Failure of the external connector-id storage collaborator.
#[derive(Debug, thiserror::Error)]
#[error("connector storage failed: {message}")]
pub struct StorageError {
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Failure of a connection orchestrator action.
///
/// Establishing actions re-raise the original failure unchanged after rolling
/// the store back; nothing here wraps an error in a way that loses its
/// identity.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The target connector is already the current one and no force flag was
    /// given.
    #[error("connector already connected")]
    AlreadyConnected,
    /// A requested chain id differs from the store's current chain id.
    #[error("the requested chain `{requested}` does not match the connected chain (id {current_id})")]
    ChainMismatch {
        /// Label of the requested chain, synthesized as `Chain {id}` when the
        /// id is not in the configured chain list.
        requested: String,
        requested_id: ChainId,
        current_id: ChainId,
    },
    /// The connector produced no transport.
    #[error("connector did not return a provider")]
    ProviderUnavailable,
    /// No connection exists to resolve a request-capable client from.
    #[error("connector not connected")]
    NotConnected,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A local signing operation failed.
    #[error(transparent)]
    Signer(#[from] alloy_signer::Error),
}

impl From<RpcError> for ConnectError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Encoding(err) => Self::Encoding(err),
            RpcError::Decoding(err) => Self::Decoding(err),
            RpcError::Transport(err) => Self::Transport(err),
        }
    }
}
