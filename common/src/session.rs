use serde::{Deserialize, Serialize};

/// An account identifier as handed out by the wallet. Opaque to the session.
pub type Account = String;

/// Wallet connection state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Holds at least one account; the first is the active one.
    Connected(Vec<Account>),
}

/// The session value shared with the rest of the UI as a read-only snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    state: SessionState,
}

/// Everything that can move a session from one state to another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Result of the startup query for already-authorized accounts.
    Probed(Vec<Account>),
    /// Result of an explicit, user-initiated connect request.
    Connected(Vec<Account>),
    /// Explicit, user-initiated disconnect.
    Disconnect,
    /// Unsolicited `accountsChanged` notification from the provider.
    AccountsChanged(Vec<Account>),
}

/// Outcome of applying a [`Trigger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    /// Account list to hand to observers, if this transition notifies.
    pub notify: Option<Vec<Account>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from an account list. Empty means disconnected.
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        let state = if accounts.is_empty() {
            SessionState::Disconnected
        } else {
            SessionState::Connected(accounts)
        };
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    pub fn accounts(&self) -> &[Account] {
        match &self.state {
            SessionState::Connected(accounts) => accounts,
            SessionState::Disconnected => &[],
        }
    }

    /// The account every other component acts on behalf of.
    pub fn active_account(&self) -> Option<&str> {
        self.accounts().first().map(String::as_str)
    }

    /// The single reducer every trigger goes through.
    pub fn apply(&self, trigger: Trigger) -> Transition {
        match trigger {
            Trigger::Probed(accounts) => {
                if accounts.is_empty() {
                    // Nothing authorized yet; stay as we are, quietly.
                    Transition {
                        session: self.clone(),
                        notify: None,
                    }
                } else {
                    Transition {
                        session: Self::from_accounts(accounts.clone()),
                        notify: Some(accounts),
                    }
                }
            }
            Trigger::Connected(accounts) => {
                if accounts.is_empty() {
                    Transition {
                        session: self.clone(),
                        notify: None,
                    }
                } else {
                    Transition {
                        session: Self::from_accounts(accounts.clone()),
                        notify: Some(accounts),
                    }
                }
            }
            Trigger::Disconnect => Transition {
                session: Self::new(),
                notify: Some(Vec::new()),
            },
            Trigger::AccountsChanged(accounts) => Transition {
                session: Self::from_accounts(accounts.clone()),
                notify: Some(accounts),
            },
        }
    }
}

/// Format an account for display: `0x1234...abcd`.
pub fn short_account(account: &str) -> String {
    const PREFIX_LEN: usize = 6;
    const SUFFIX_LEN: usize = 4;

    if !account.is_ascii() || account.len() <= PREFIX_LEN + SUFFIX_LEN {
        return account.to_string();
    }
    format!(
        "{}...{}",
        &account[..PREFIX_LEN],
        &account[account.len() - SUFFIX_LEN..]
    )
}
