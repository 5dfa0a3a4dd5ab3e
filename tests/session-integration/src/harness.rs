use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;

use chainboard_common::provider::{AccountsListener, ProviderError, SubscriptionId, WalletProvider};
use chainboard_common::session::Account;
use chainboard_common::wallet_session::WalletSession;

pub const ALICE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const BOB: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const CAROL: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

pub fn accounts(list: &[&str]) -> Vec<Account> {
    list.iter().map(|a| a.to_string()).collect()
}

type Reply = Result<Vec<Account>, ProviderError>;

struct Inner {
    installed: bool,
    authorized: RefCell<Reply>,
    /// When set, `request_accounts` answers immediately with this.
    grant: RefCell<Option<Reply>>,
    pending: RefCell<VecDeque<oneshot::Sender<Reply>>>,
    listeners: RefCell<Vec<(SubscriptionId, AccountsListener)>>,
    next_subscription: Cell<u64>,
    probe_calls: Cell<usize>,
    request_calls: Cell<usize>,
    subscribe_calls: Cell<usize>,
}

/// Scripted stand-in for a browser wallet.
///
/// Account requests stay pending until [`MockWallet::resolve_next`] is called,
/// unless an immediate answer was set with [`MockWallet::grant`].
#[derive(Clone)]
pub struct MockWallet {
    inner: Rc<Inner>,
}

impl MockWallet {
    fn build(installed: bool) -> Self {
        Self {
            inner: Rc::new(Inner {
                installed,
                authorized: RefCell::new(Ok(Vec::new())),
                grant: RefCell::new(None),
                pending: RefCell::new(VecDeque::new()),
                listeners: RefCell::new(Vec::new()),
                next_subscription: Cell::new(1),
                probe_calls: Cell::new(0),
                request_calls: Cell::new(0),
                subscribe_calls: Cell::new(0),
            }),
        }
    }

    pub fn installed() -> Self {
        Self::build(true)
    }

    pub fn absent() -> Self {
        Self::build(false)
    }

    /// What `eth_accounts` returns.
    pub fn with_authorized(self, reply: Reply) -> Self {
        *self.inner.authorized.borrow_mut() = reply;
        self
    }

    /// Answer every `eth_requestAccounts` immediately.
    pub fn grant(&self, reply: Reply) {
        *self.inner.grant.borrow_mut() = Some(reply);
    }

    /// Complete the oldest pending account request.
    pub fn resolve_next(&self, reply: Reply) {
        let sender = self
            .inner
            .pending
            .borrow_mut()
            .pop_front()
            .expect("no account request is pending");
        let _ = sender.send(reply);
    }

    pub fn pending_requests(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Fire `accountsChanged` to every registered listener.
    pub fn emit(&self, accounts: Vec<Account>) {
        let listeners: Vec<AccountsListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(accounts.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn probe_calls(&self) -> usize {
        self.inner.probe_calls.get()
    }

    pub fn request_calls(&self) -> usize {
        self.inner.request_calls.get()
    }

    /// Every call that reached the wallet, subscriptions included.
    pub fn total_calls(&self) -> usize {
        self.probe_calls() + self.request_calls() + self.inner.subscribe_calls.get()
    }
}

impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.inner.installed
    }

    async fn authorized_accounts(&self) -> Result<Vec<Account>, ProviderError> {
        self.inner.probe_calls.set(self.inner.probe_calls.get() + 1);
        self.inner.authorized.borrow().clone()
    }

    async fn request_accounts(&self) -> Result<Vec<Account>, ProviderError> {
        self.inner.request_calls.set(self.inner.request_calls.get() + 1);
        let immediate = self.inner.grant.borrow().clone();
        if let Some(reply) = immediate {
            return reply;
        }
        let (tx, rx) = oneshot::channel();
        self.inner.pending.borrow_mut().push_back(tx);
        rx.await
            .unwrap_or_else(|_| Err(ProviderError::other("account request dropped")))
    }

    fn subscribe_accounts(&self, listener: AccountsListener) -> SubscriptionId {
        self.inner.subscribe_calls.set(self.inner.subscribe_calls.get() + 1);
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.listeners.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}

/// Every account list an observer was handed, in order.
#[derive(Clone, Default)]
pub struct Notifications {
    seen: Rc<RefCell<Vec<Vec<Account>>>>,
}

impl Notifications {
    pub fn attach(session: &WalletSession<MockWallet>) -> Self {
        let recorder = Self::default();
        let seen = Rc::clone(&recorder.seen);
        session.observe(move |accounts| seen.borrow_mut().push(accounts.to_vec()));
        recorder
    }

    pub fn all(&self) -> Vec<Vec<Account>> {
        self.seen.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.borrow().len()
    }
}

/// A session over a fresh installed wallet, with a notification recorder.
pub fn session_with(wallet: &MockWallet) -> (WalletSession<MockWallet>, Notifications) {
    let session = WalletSession::new(wallet.clone());
    let notes = Notifications::attach(&session);
    (session, notes)
}

/// `connected` holds exactly when the account list is non-empty.
pub fn assert_consistent(session: &WalletSession<MockWallet>) {
    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.is_connected(),
        !snapshot.accounts().is_empty(),
        "inconsistent session: {snapshot:?}"
    );
}
