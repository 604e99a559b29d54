//! # Typed wallet RPC schemas and codec
//!
//! This crate declares the `wallet_*` JSON-RPC surface spoken against an
//! [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193)-style provider:
//!
//! - [`WalletMethod`]: the enumerable method registry, with a
//!   [`MethodDescriptor`] per method describing its parameter and response
//!   schemas.
//! - [`WalletRpc`]: compile-time method markers binding each method name to
//!   its typed parameter and response shapes.
//! - [`codec`]: the single point where typed values are encoded into wire
//!   JSON and untrusted provider output is validated back into typed values.
//! - [`Transport`]: the request/response channel to a connected provider.
//!
//! Encoding and decoding are pure and synchronous; any structural mismatch
//! surfaces as [`EncodingError`] or [`DecodingError`] naming the method and
//! the offending field.

pub mod capabilities;
pub mod codec;
mod error;
mod method;
pub mod methods;
mod transport;
pub mod types;

pub use error::{DecodingError, EncodingError, RpcError, TransportError, UnknownMethodError};
pub use method::{MethodDescriptor, WalletMethod};
pub use methods::WalletRpc;
pub use transport::{Transport, request};
