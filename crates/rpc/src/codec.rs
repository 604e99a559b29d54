//! Wire codec for typed wallet RPC values.
//!
//! [`decode_response`] is the single point where untrusted provider output is
//! trusted into a typed value; no caller bypasses it. Both directions are
//! pure and synchronous.

use serde_json::Value;

use crate::{DecodingError, EncodingError, WalletRpc};

/// Encodes typed parameters into the wire-format `params` array.
///
/// Produces `[{...}]` for methods with a parameter schema and `[]` for
/// parameter-less methods; absent optionals are structurally pruned by the
/// parameter types' serde representation.
pub fn encode_params<M: WalletRpc>(params: &M::Params) -> Result<Value, EncodingError> {
    let value = serde_json::to_value(params)
        .map_err(|source| EncodingError { method: M::METHOD.as_str(), source })?;
    Ok(match value {
        Value::Null => Value::Array(Vec::new()),
        value => Value::Array(vec![value]),
    })
}

/// Decodes a wire-format `params` array back into typed parameters.
pub fn decode_params<M: WalletRpc>(params: Value) -> Result<M::Params, DecodingError> {
    let method = M::METHOD.as_str();
    match params {
        Value::Array(values) if values.is_empty() => {
            serde_json::from_value(Value::Null).map_err(|source| DecodingError { method, source })
        }
        Value::Array(mut values) if values.len() == 1 => serde_json::from_value(values.remove(0))
            .map_err(|source| DecodingError { method, source }),
        other => {
            let source: serde_json::Error = serde::de::Error::custom(format!(
                "expected a single-element params array, got {other}"
            ));
            Err(DecodingError { method, source })
        }
    }
}

/// Validates an untrusted wire response against the method's response schema
/// and returns the typed value.
pub fn decode_response<M: WalletRpc>(response: Value) -> Result<M::Response, DecodingError> {
    serde_json::from_value(response)
        .map_err(|source| DecodingError { method: M::METHOD.as_str(), source })
}
