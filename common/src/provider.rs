use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::session::Account;

/// EIP-1193 code for a request the user declined in the wallet UI.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Error returned by an injected provider, mirroring the EIP-1193 error object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn not_installed() -> Self {
        Self::other("no wallet provider is installed")
    }

    pub fn user_rejected() -> Self {
        Self::new(Some(USER_REJECTED_CODE), "User rejected the request.")
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

/// Callback registered for `accountsChanged`.
pub type AccountsListener = Rc<dyn Fn(Vec<Account>)>;

/// Handle returned by a subscription, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// The wallet capabilities the session needs.
///
/// Futures are not `Send`: everything runs on the page's single thread.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Capability probe. `false` means no wallet extension is present.
    fn is_available(&self) -> bool;

    /// Accounts the page is already authorized for. Never prompts.
    async fn authorized_accounts(&self) -> Result<Vec<Account>, ProviderError>;

    /// Ask the wallet for account access. May prompt the user, without a timeout.
    async fn request_accounts(&self) -> Result<Vec<Account>, ProviderError>;

    /// Register for `accountsChanged` notifications.
    fn subscribe_accounts(&self, listener: AccountsListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}
