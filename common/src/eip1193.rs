//! EIP-1193 request plumbing.
//!
//! The browser exposes a single `request({ method, params })` entry point plus
//! `on`/`removeListener` for events. [`Eip1193`] is that surface; the adapters
//! here turn it into the typed [`WalletProvider`] used by the session.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::provider::{AccountsListener, ProviderError, SubscriptionId, WalletProvider};
use crate::session::Account;

pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_GAS_PRICE: &str = "eth_gasPrice";
pub const ETH_CALL: &str = "eth_call";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";

/// Event name for account changes.
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";

/// The argument object passed to `provider.request`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RpcRequest<'a> {
    pub method: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

/// Raw EIP-1193 provider.
#[allow(async_fn_in_trait)]
pub trait Eip1193 {
    /// Whether a provider object is actually present.
    fn is_available(&self) -> bool;

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    fn on_accounts_changed(&self, listener: AccountsListener) -> SubscriptionId;

    fn remove_listener(&self, id: SubscriptionId);
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("unexpected {method} response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Issue `method` and decode the result into `T`.
pub(crate) async fn call<T, P>(provider: &P, method: &'static str, params: Value) -> Result<T, RpcError>
where
    T: DeserializeOwned,
    P: Eip1193,
{
    if !provider.is_available() {
        return Err(ProviderError::not_installed().into());
    }
    let value = provider.request(method, params).await?;
    serde_json::from_value(value).map_err(|source| RpcError::Decode { method, source })
}

/// [`WalletProvider`] over any EIP-1193 transport.
#[derive(Clone, Debug)]
pub struct Eip1193Wallet<T> {
    transport: T,
}

impl<T: Eip1193> Eip1193Wallet<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn accounts(&self, method: &'static str) -> Result<Vec<Account>, ProviderError> {
        call(&self.transport, method, Value::Array(Vec::new()))
            .await
            .map_err(|err| match err {
                RpcError::Provider(err) => err,
                other => ProviderError::other(other.to_string()),
            })
    }
}

impl<T: Eip1193> WalletProvider for Eip1193Wallet<T> {
    fn is_available(&self) -> bool {
        self.transport.is_available()
    }

    async fn authorized_accounts(&self) -> Result<Vec<Account>, ProviderError> {
        self.accounts(ETH_ACCOUNTS).await
    }

    async fn request_accounts(&self) -> Result<Vec<Account>, ProviderError> {
        self.accounts(ETH_REQUEST_ACCOUNTS).await
    }

    fn subscribe_accounts(&self, listener: AccountsListener) -> SubscriptionId {
        self.transport.on_accounts_changed(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.transport.remove_listener(id)
    }
}
