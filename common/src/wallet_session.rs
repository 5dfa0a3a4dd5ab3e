//! The wallet session driver.
//!
//! Owns the single [`Session`] value and feeds every trigger (startup probe,
//! explicit connect, explicit disconnect, provider `accountsChanged`) through
//! [`Session::apply`]. Async provider calls are tagged with the epoch at which
//! they were issued; a resolution is applied only if no other transition
//! happened in between, so state always follows event-arrival order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::provider::{AccountsListener, SubscriptionId, WalletProvider};
use crate::session::{Account, Session, Trigger};

/// Handle returned by [`WalletSession::observe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// What happened to an explicit connect request that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The wallet granted access; the session is now connected to these accounts.
    Connected(Vec<Account>),
    /// Another connect request was already waiting on the wallet.
    AlreadyPending,
    /// A newer event (account change, disconnect) arrived while waiting.
    Superseded,
    /// The session was torn down.
    Closed,
}

type Observer = Rc<RefCell<dyn FnMut(&[Account])>>;

#[derive(Default)]
struct Core {
    session: Session,
    /// Bumped on every applied transition.
    epoch: u64,
    connect_pending: bool,
    closed: bool,
    last_error: Option<SessionError>,
    subscription: Option<SubscriptionId>,
}

struct Inner<P: WalletProvider> {
    provider: P,
    core: RefCell<Core>,
    observers: RefCell<Vec<(ObserverId, Observer)>>,
    next_observer: Cell<u64>,
}

/// Connection state for one page load. Cloning shares the same session.
pub struct WalletSession<P: WalletProvider> {
    inner: Rc<Inner<P>>,
}

impl<P: WalletProvider> Drop for Inner<P> {
    fn drop(&mut self) {
        if let Some(id) = self.core.get_mut().subscription.take() {
            debug!("last session handle dropped, unsubscribing");
            self.provider.unsubscribe(id);
        }
    }
}

impl<P: WalletProvider> Clone for WalletSession<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Clears the in-flight flag even if the connect future is dropped mid-await.
struct PendingConnect<'a> {
    core: &'a RefCell<Core>,
}

impl Drop for PendingConnect<'_> {
    fn drop(&mut self) {
        self.core.borrow_mut().connect_pending = false;
    }
}

impl<P: WalletProvider + 'static> WalletSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            inner: Rc::new(Inner {
                provider,
                core: RefCell::new(Core::default()),
                observers: RefCell::new(Vec::new()),
                next_observer: Cell::new(0),
            }),
        }
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    /// Immutable copy of the current session for display components.
    pub fn snapshot(&self) -> Session {
        self.inner.core.borrow().session.clone()
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.inner.core.borrow().last_error.clone()
    }

    pub fn is_connect_pending(&self) -> bool {
        self.inner.core.borrow().connect_pending
    }

    pub fn is_closed(&self) -> bool {
        self.inner.core.borrow().closed
    }

    /// Register a callback that receives the account list on every transition.
    pub fn observe(&self, observer: impl FnMut(&[Account]) + 'static) -> ObserverId {
        let id = ObserverId(self.inner.next_observer.get());
        self.inner.next_observer.set(id.0 + 1);
        let observer: Observer = Rc::new(RefCell::new(observer));
        self.inner.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn unobserve(&self, id: ObserverId) {
        self.inner.observers.borrow_mut().retain(|(oid, _)| *oid != id);
    }

    /// Subscribe to account changes and pick up any existing authorization.
    ///
    /// Without an installed provider this does nothing: the error is only
    /// surfaced once the user asks to connect.
    pub async fn mount(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Ok(());
        }
        if !self.inner.provider.is_available() {
            debug!("no wallet provider detected at startup");
            return Ok(());
        }
        self.subscribe();
        self.probe().await
    }

    /// Ask the provider which accounts are already authorized.
    pub async fn probe(&self) -> Result<(), SessionError> {
        if self.is_closed() || !self.inner.provider.is_available() {
            return Ok(());
        }

        let ticket = self.epoch();
        let result = self.inner.provider.authorized_accounts().await;

        if self.is_closed() {
            debug!("dropping account probe result after teardown");
            return Ok(());
        }
        if !self.is_current(ticket) {
            debug!("dropping stale account probe result");
            return Ok(());
        }

        match result {
            Ok(accounts) => {
                debug!(count = accounts.len(), "startup probe resolved");
                self.apply(Trigger::Probed(accounts));
                Ok(())
            }
            Err(err) => {
                warn!(%err, "failed to query authorized accounts");
                Err(self.fail(SessionError::account_query(&err)))
            }
        }
    }

    /// Request account access from the wallet.
    ///
    /// Only one request is in flight at a time; extra calls while waiting
    /// return [`ConnectOutcome::AlreadyPending`] without touching the provider.
    pub async fn connect(&self) -> Result<ConnectOutcome, SessionError> {
        let ticket = {
            let mut core = self.inner.core.borrow_mut();
            if core.closed {
                return Ok(ConnectOutcome::Closed);
            }
            if !self.inner.provider.is_available() {
                let err = SessionError::ProviderNotInstalled;
                core.last_error = Some(err.clone());
                warn!("connect requested without a wallet provider");
                return Err(err);
            }
            if core.connect_pending {
                debug!("connect already pending, coalescing");
                return Ok(ConnectOutcome::AlreadyPending);
            }
            core.connect_pending = true;
            core.epoch
        };

        let result = {
            let _pending = PendingConnect {
                core: &self.inner.core,
            };
            self.inner.provider.request_accounts().await
        };

        if self.is_closed() {
            return Ok(ConnectOutcome::Closed);
        }
        if !self.is_current(ticket) {
            debug!("dropping stale connect resolution");
            return Ok(ConnectOutcome::Superseded);
        }

        match result {
            Ok(accounts) if accounts.is_empty() => {
                warn!("wallet granted access to no accounts");
                Err(self.fail(SessionError::AuthorizationFailed(
                    "wallet returned no accounts".into(),
                )))
            }
            Ok(accounts) => {
                info!(account = %accounts[0], count = accounts.len(), "wallet connected");
                self.apply(Trigger::Connected(accounts.clone()));
                Ok(ConnectOutcome::Connected(accounts))
            }
            Err(err) => {
                warn!(%err, rejected = err.is_user_rejection(), "wallet connect failed");
                Err(self.fail(SessionError::authorization(&err)))
            }
        }
    }

    /// Forget the accounts locally. The wallet keeps its authorization.
    pub fn disconnect(&self) {
        if self.is_closed() {
            return;
        }
        info!("wallet disconnected");
        self.inner.core.borrow_mut().last_error = None;
        self.apply(Trigger::Disconnect);
    }

    /// Entry point for the provider's `accountsChanged` event.
    pub fn accounts_changed(&self, accounts: Vec<Account>) {
        if self.is_closed() {
            debug!("ignoring account change after teardown");
            return;
        }
        debug!(count = accounts.len(), "wallet accounts changed");
        self.apply(Trigger::AccountsChanged(accounts));
    }

    /// Stop listening to the provider and drop all observers.
    pub fn teardown(&self) {
        let subscription = {
            let mut core = self.inner.core.borrow_mut();
            if core.closed {
                return;
            }
            core.closed = true;
            core.subscription.take()
        };
        if let Some(id) = subscription {
            self.inner.provider.unsubscribe(id);
        }
        self.inner.observers.borrow_mut().clear();
        debug!("wallet session torn down");
    }

    fn subscribe(&self) {
        let weak = Rc::downgrade(&self.inner);
        let listener: AccountsListener = Rc::new(move |accounts| {
            if let Some(inner) = weak.upgrade() {
                WalletSession { inner }.accounts_changed(accounts);
            }
        });
        let id = self.inner.provider.subscribe_accounts(listener);
        let previous = self.inner.core.borrow_mut().subscription.replace(id);
        if let Some(previous) = previous {
            self.inner.provider.unsubscribe(previous);
        }
    }

    fn epoch(&self) -> u64 {
        self.inner.core.borrow().epoch
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.inner.core.borrow().epoch == ticket
    }

    fn fail(&self, err: SessionError) -> SessionError {
        self.inner.core.borrow_mut().last_error = Some(err.clone());
        err
    }

    /// Run `trigger` through the reducer and notify observers if it transitioned.
    fn apply(&self, trigger: Trigger) {
        let (notify, epoch) = {
            let mut core = self.inner.core.borrow_mut();
            if core.closed {
                return;
            }
            let transition = core.session.apply(trigger);
            let Some(notify) = transition.notify else {
                return;
            };
            core.session = transition.session;
            core.epoch += 1;
            if core.session.is_connected() {
                core.last_error = None;
            }
            (notify, core.epoch)
        };

        // No borrow is held here, so observers may call back into the session.
        let observers: Vec<Observer> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            // A nested transition already delivered newer accounts.
            if !self.is_current(epoch) {
                break;
            }
            // An observer that triggered this transition is still running.
            let Ok(mut observer) = observer.try_borrow_mut() else {
                continue;
            };
            (&mut *observer)(&notify);
        }
    }
}
