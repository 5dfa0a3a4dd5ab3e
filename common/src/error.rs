use thiserror::Error;

use crate::provider::ProviderError;

/// Errors surfaced to the user by the wallet session.
///
/// Each one ends the attempt that produced it; nothing is retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No wallet provider found. Please install MetaMask or another browser wallet.")]
    ProviderNotInstalled,
    #[error("Failed to connect wallet: {0}")]
    AuthorizationFailed(String),
    #[error("Failed to query wallet accounts: {0}")]
    AccountQueryFailed(String),
}

impl SessionError {
    pub(crate) fn authorization(err: &ProviderError) -> Self {
        Self::AuthorizationFailed(err.message.clone())
    }

    pub(crate) fn account_query(err: &ProviderError) -> Self {
        Self::AccountQueryFailed(err.message.clone())
    }
}
