//! Compile-time method markers.
//!
//! Each marker binds a [`WalletMethod`] to its typed parameter and response
//! shapes so a request site can name the method once and have both wire
//! directions checked.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    WalletMethod,
    capabilities::Permission,
    types::{
        AccountParameters, ConnectParameters, ConnectResponse, CreateAccountParameters,
        GetAdminsResponse, GrantAdminParameters, GrantAdminResponse, GrantPermissionsParameters,
        PrepareUpgradeAccountParameters, PrepareUpgradeAccountResponse, RevokeParameters,
        UpgradeAccountParameters,
    },
};

mod private {
    pub trait Sealed {}
}

/// A schema registry entry, resolved at compile time.
///
/// Sealed: the registry is closed over the methods of [`WalletMethod`].
pub trait WalletRpc: private::Sealed {
    const METHOD: WalletMethod;
    type Params: Serialize + DeserializeOwned + Send + Sync;
    type Response: DeserializeOwned;
}

macro_rules! wallet_rpc {
    ($(#[$attr:meta])* $name:ident, $method:ident, $params:ty, $response:ty) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug)]
        pub struct $name;

        impl private::Sealed for $name {}

        impl WalletRpc for $name {
            const METHOD: WalletMethod = WalletMethod::$method;
            type Params = $params;
            type Response = $response;
        }
    };
}

wallet_rpc!(
    /// `wallet_connect`.
    Connect, Connect, ConnectParameters, ConnectResponse
);
wallet_rpc!(
    /// `wallet_createAccount`.
    CreateAccount, CreateAccount, CreateAccountParameters, ConnectResponse
);
wallet_rpc!(
    /// `wallet_disconnect`: best-effort notification, nothing either way.
    Disconnect, Disconnect, (), ()
);
wallet_rpc!(
    /// `wallet_getAdmins`.
    GetAdmins, GetAdmins, AccountParameters, GetAdminsResponse
);
wallet_rpc!(
    /// `wallet_getPermissions`.
    GetPermissions, GetPermissions, AccountParameters, Vec<Permission>
);
wallet_rpc!(
    /// `wallet_grantAdmin`.
    GrantAdmin, GrantAdmin, GrantAdminParameters, GrantAdminResponse
);
wallet_rpc!(
    /// `wallet_grantPermissions`.
    GrantPermissions, GrantPermissions, GrantPermissionsParameters, Permission
);
wallet_rpc!(
    /// `wallet_prepareUpgradeAccount`.
    PrepareUpgradeAccount,
    PrepareUpgradeAccount,
    PrepareUpgradeAccountParameters,
    PrepareUpgradeAccountResponse
);
wallet_rpc!(
    /// `wallet_revokeAdmin`: opaque result.
    RevokeAdmin, RevokeAdmin, RevokeParameters, Value
);
wallet_rpc!(
    /// `wallet_revokePermissions`: opaque result.
    RevokePermissions, RevokePermissions, RevokeParameters, Value
);
wallet_rpc!(
    /// `wallet_upgradeAccount`: opaque success marker.
    UpgradeAccount, UpgradeAccount, UpgradeAccountParameters, Value
);
