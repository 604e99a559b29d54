use std::fmt;

/// A method name that is not part of the wallet RPC schema.
#[derive(Debug, thiserror::Error)]
#[error("unknown wallet RPC method: `{0}`")]
pub struct UnknownMethodError(pub String);

/// A typed parameter value could not be represented as wire JSON for its
/// method's parameter schema.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode `{method}` parameters: {source}")]
pub struct EncodingError {
    /// Method whose parameter schema was violated.
    pub method: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// A wire value did not conform to the schema it was validated against.
///
/// The underlying serde error names the violating field or type.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode `{method}` payload: {source}")]
pub struct DecodingError {
    /// Method whose schema was violated.
    pub method: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Opaque failure raised by the underlying transport.
///
/// The reason is defined by the transport and passed through unchanged.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    /// Creates a transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Creates a transport error from any displayable failure.
    pub fn other(err: impl fmt::Display) -> Self {
        Self::new(err.to_string())
    }
}

/// Failure of a single typed RPC request.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
