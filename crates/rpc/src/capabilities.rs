//! Capability payloads negotiated as part of wallet RPC calls.
//!
//! Capabilities are value types: schema-validated before transmission and
//! after receipt, never mutated after construction.

use alloy_primitives::{Address, Bytes, ChainId, U256};
use serde::{Deserialize, Serialize};

/// Token used to pay wallet fees, referenced by address or by symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeeToken {
    Address(Address),
    Symbol(String),
}

/// `createAccount` capability: a plain opt-in flag or explicit options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateAccount {
    Flag(bool),
    Options {
        #[serde(default, rename = "chainId", skip_serializing_if = "Option::is_none")]
        chain_id: Option<ChainId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// `selectAccount` capability: a plain flag or a specific account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectAccount {
    Flag(bool),
    Account { address: Address },
}

/// Signing key algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyType {
    P256,
    Secp256k1,
    WebauthnP256,
}

/// Public key a capability is granted to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub public_key: Bytes,
    #[serde(rename = "type")]
    pub kind: KeyType,
}

/// Admin key record, as returned by `wallet_getAdmins`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bytes>,
    pub public_key: Bytes,
    #[serde(rename = "type")]
    pub kind: KeyType,
}

/// Permission to call a contract, optionally scoped to a function selector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallPermission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
}

/// Accounting period of a spend limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendPeriod {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Permission to spend up to `limit` of `token` per `period`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendPermission {
    pub limit: U256,
    pub period: SpendPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
}

/// Set of call and spend permissions attached to a key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CallPermission>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spend: Vec<SpendPermission>,
}

/// Permission grant request, used both as the `grantPermissions` capability
/// of `wallet_connect` and as the body of `wallet_grantPermissions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsRequest {
    /// Unix timestamp after which the grant expires.
    pub expiry: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_token: Option<FeeToken>,
    /// Key the permissions are granted to. Absent means the wallet picks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub permissions: Permissions,
}

/// Granted permission record, as returned by the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    pub expiry: u64,
    pub id: Bytes,
    pub key: Key,
    pub permissions: Permissions,
}

/// Capabilities of a `wallet_connect` handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_account: Option<CreateAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_permissions: Option<PermissionsRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_account: Option<SelectAccount>,
}

/// `{feeToken}` capability envelope used by the revoke and grant-admin
/// methods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTokenCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_token: Option<FeeToken>,
}

/// Capabilities of `wallet_prepareUpgradeAccount`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_token: Option<FeeToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_permissions: Option<PermissionsRequest>,
}
