pub mod chain;
pub mod config;
pub mod contract;
pub mod eip1193;
pub mod error;
pub mod provider;
pub mod session;
pub mod transfer;
pub mod wallet_session;

pub use error::SessionError;
pub use provider::{ProviderError, WalletProvider};
pub use session::{Account, Session, SessionState};
pub use wallet_session::{ConnectOutcome, WalletSession};
