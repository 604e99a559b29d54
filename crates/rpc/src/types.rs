//! Per-method parameter and response shapes.
//!
//! These are the wire objects carried in the single-element `params` array of
//! each request (see the method table in [`crate::WalletMethod`]).

use alloy_primitives::{Address, B256, Bytes, ChainId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capabilities::{
    AdminKey, ConnectCapabilities, FeeTokenCapabilities, Key, Permission, PermissionsRequest,
    UpgradeCapabilities,
};

/// Parameters of `wallet_connect`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParameters {
    pub capabilities: ConnectCapabilities,
}

/// Single account entry of a `wallet_connect` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,
}

/// Response of `wallet_connect` and `wallet_createAccount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub accounts: Vec<ConnectedAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain_ids: Vec<ChainId>,
}

/// Parameters of `wallet_createAccount`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// `{address}` selector shared by `wallet_getAdmins` and
/// `wallet_getPermissions`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Response of `wallet_getAdmins`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAdminsResponse {
    pub address: Address,
    pub chain_id: ChainId,
    pub keys: Vec<AdminKey>,
}

/// Parameters of `wallet_grantAdmin`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAdminParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<FeeTokenCapabilities>,
    pub key: Key,
}

/// Response of `wallet_grantAdmin`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAdminResponse {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    pub key: Key,
}

/// Parameters of `wallet_grantPermissions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionsParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(flatten)]
    pub request: PermissionsRequest,
}

/// Parameters of `wallet_revokeAdmin` and `wallet_revokePermissions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub capabilities: FeeTokenCapabilities,
    pub id: Bytes,
}

/// Parameters of `wallet_prepareUpgradeAccount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareUpgradeAccountParameters {
    pub address: Address,
    pub capabilities: UpgradeCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Response of `wallet_prepareUpgradeAccount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUpgradeAccountResponse {
    /// Opaque wallet-side context, echoed back in `wallet_upgradeAccount`.
    pub context: Value,
    /// Hashes the local account must sign, in order.
    pub sign_payloads: Vec<B256>,
}

/// Parameters of `wallet_upgradeAccount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeAccountParameters {
    pub context: Value,
    /// Signatures over the prepared payloads, in payload order.
    pub signatures: Vec<Bytes>,
}
