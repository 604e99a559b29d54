use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    DecodingError, UnknownMethodError,
    capabilities::Permission,
    types::{
        AccountParameters, ConnectParameters, ConnectResponse, CreateAccountParameters,
        GetAdminsResponse, GrantAdminParameters, GrantAdminResponse, GrantPermissionsParameters,
        PrepareUpgradeAccountParameters, PrepareUpgradeAccountResponse, RevokeParameters,
        UpgradeAccountParameters,
    },
};

/// A method of the wallet RPC schema.
///
/// The registry is static and fully enumerable via [`Self::ALL`]; every
/// method issued by the connection orchestrator has an entry here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletMethod {
    Connect,
    CreateAccount,
    Disconnect,
    GetAdmins,
    GetPermissions,
    GrantAdmin,
    GrantPermissions,
    PrepareUpgradeAccount,
    RevokeAdmin,
    RevokePermissions,
    UpgradeAccount,
}

impl WalletMethod {
    /// Every method of the schema.
    pub const ALL: [Self; 11] = [
        Self::Connect,
        Self::CreateAccount,
        Self::Disconnect,
        Self::GetAdmins,
        Self::GetPermissions,
        Self::GrantAdmin,
        Self::GrantPermissions,
        Self::PrepareUpgradeAccount,
        Self::RevokeAdmin,
        Self::RevokePermissions,
        Self::UpgradeAccount,
    ];

    /// The wire-level method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "wallet_connect",
            Self::CreateAccount => "wallet_createAccount",
            Self::Disconnect => "wallet_disconnect",
            Self::GetAdmins => "wallet_getAdmins",
            Self::GetPermissions => "wallet_getPermissions",
            Self::GrantAdmin => "wallet_grantAdmin",
            Self::GrantPermissions => "wallet_grantPermissions",
            Self::PrepareUpgradeAccount => "wallet_prepareUpgradeAccount",
            Self::RevokeAdmin => "wallet_revokeAdmin",
            Self::RevokePermissions => "wallet_revokePermissions",
            Self::UpgradeAccount => "wallet_upgradeAccount",
        }
    }

    /// Looks up a method by its wire name.
    pub fn from_name(name: &str) -> Result<Self, UnknownMethodError> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == name)
            .ok_or_else(|| UnknownMethodError(name.to_string()))
    }

    /// The schema descriptor of this method.
    pub fn descriptor(self) -> MethodDescriptor {
        let (params, response): (Option<Validator>, Option<Validator>) = match self {
            Self::Connect => (
                Some(validate_params::<ConnectParameters>),
                Some(validate_value::<ConnectResponse>),
            ),
            Self::CreateAccount => (
                Some(validate_params::<CreateAccountParameters>),
                Some(validate_value::<ConnectResponse>),
            ),
            // Fire-and-forget: no parameters, no expected response.
            Self::Disconnect => (None, None),
            Self::GetAdmins => (
                Some(validate_params::<AccountParameters>),
                Some(validate_value::<GetAdminsResponse>),
            ),
            Self::GetPermissions => (
                Some(validate_params::<AccountParameters>),
                Some(validate_value::<Vec<Permission>>),
            ),
            Self::GrantAdmin => (
                Some(validate_params::<GrantAdminParameters>),
                Some(validate_value::<GrantAdminResponse>),
            ),
            Self::GrantPermissions => (
                Some(validate_params::<GrantPermissionsParameters>),
                Some(validate_value::<Permission>),
            ),
            Self::PrepareUpgradeAccount => (
                Some(validate_params::<PrepareUpgradeAccountParameters>),
                Some(validate_value::<PrepareUpgradeAccountResponse>),
            ),
            // Result is an opaque success marker.
            Self::RevokeAdmin => (Some(validate_params::<RevokeParameters>), None),
            Self::RevokePermissions => (Some(validate_params::<RevokeParameters>), None),
            Self::UpgradeAccount => (Some(validate_params::<UpgradeAccountParameters>), None),
        };
        MethodDescriptor { method: self, params, response }
    }
}

impl fmt::Display for WalletMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

type Validator = fn(&'static str, &Value) -> Result<(), DecodingError>;

/// Schema registry entry: which schemas a method carries, plus validation
/// hooks backed by the method's typed shapes.
#[derive(Clone, Copy)]
pub struct MethodDescriptor {
    pub method: WalletMethod,
    params: Option<Validator>,
    response: Option<Validator>,
}

impl MethodDescriptor {
    /// Whether the method declares a parameter schema.
    pub fn has_params(&self) -> bool {
        self.params.is_some()
    }

    /// Whether the method declares a response schema.
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Validates a wire-format `params` array against the parameter schema.
    ///
    /// Schema-less methods accept anything.
    pub fn validate_params(&self, params: &Value) -> Result<(), DecodingError> {
        match self.params {
            Some(validate) => validate(self.method.as_str(), params),
            None => Ok(()),
        }
    }

    /// Validates a wire-format response against the response schema.
    pub fn validate_response(&self, response: &Value) -> Result<(), DecodingError> {
        match self.response {
            Some(validate) => validate(self.method.as_str(), response),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("method", &self.method)
            .field("params", &self.params.is_some())
            .field("response", &self.response.is_some())
            .finish()
    }
}

/// Validates a single-element `params` array `[T]`.
fn validate_params<T: for<'de> Deserialize<'de>>(
    method: &'static str,
    value: &Value,
) -> Result<(), DecodingError> {
    <(T,)>::deserialize(value).map(drop).map_err(|source| DecodingError { method, source })
}

fn validate_value<T: for<'de> Deserialize<'de>>(
    method: &'static str,
    value: &Value,
) -> Result<(), DecodingError> {
    T::deserialize(value).map(drop).map_err(|source| DecodingError { method, source })
}
