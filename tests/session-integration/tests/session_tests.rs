use std::pin::pin;
use std::task::Poll;

use futures::poll;

use chainboard_common::provider::ProviderError;
use chainboard_common::session::SessionState;
use chainboard_common::wallet_session::ConnectOutcome;
use chainboard_common::SessionError;
use chainboard_session_integration::harness::{
    accounts, assert_consistent, session_with, MockWallet, ALICE, BOB, CAROL,
};
use chainboard_session_integration::init_tracing;

/// Connected iff accounts are non-empty, across a mixed run of every trigger.
#[tokio::test]
async fn connected_matches_accounts_after_every_trigger() {
    init_tracing();
    let wallet = MockWallet::installed().with_authorized(Ok(accounts(&[ALICE])));
    let (session, _notes) = session_with(&wallet);

    session.mount().await.unwrap();
    assert_consistent(&session);

    wallet.emit(accounts(&[]));
    assert_consistent(&session);

    wallet.grant(Ok(accounts(&[BOB, CAROL])));
    session.connect().await.unwrap();
    assert_consistent(&session);

    wallet.emit(accounts(&[CAROL]));
    assert_consistent(&session);

    session.disconnect();
    assert_consistent(&session);

    wallet.grant(Err(ProviderError::user_rejected()));
    let _ = session.connect().await;
    assert_consistent(&session);

    wallet.emit(accounts(&[ALICE]));
    assert_consistent(&session);
    assert_eq!(session.snapshot().active_account(), Some(ALICE));
}

#[tokio::test]
async fn startup_probe_without_accounts_is_silent() {
    init_tracing();
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);

    session.mount().await.unwrap();

    assert_eq!(session.snapshot().state(), &SessionState::Disconnected);
    assert_eq!(notes.count(), 0);
    assert_eq!(wallet.probe_calls(), 1);
    assert_eq!(wallet.request_calls(), 0);
    assert_eq!(wallet.listener_count(), 1);
}

#[tokio::test]
async fn startup_probe_restores_existing_authorization() {
    let wallet = MockWallet::installed().with_authorized(Ok(accounts(&[ALICE, BOB])));
    let (session, notes) = session_with(&wallet);

    session.mount().await.unwrap();

    assert_eq!(session.snapshot().accounts(), accounts(&[ALICE, BOB]).as_slice());
    assert_eq!(notes.all(), vec![accounts(&[ALICE, BOB])]);
    assert_eq!(wallet.request_calls(), 0);
}

#[tokio::test]
async fn startup_probe_failure_is_reported() {
    let wallet =
        MockWallet::installed().with_authorized(Err(ProviderError::other("wallet locked")));
    let (session, notes) = session_with(&wallet);

    let err = session.mount().await.unwrap_err();

    assert_eq!(err, SessionError::AccountQueryFailed("wallet locked".into()));
    assert_eq!(session.last_error(), Some(err));
    assert!(!session.snapshot().is_connected());
    assert_eq!(notes.count(), 0);
}

#[tokio::test]
async fn connect_yields_all_accounts_with_one_notification() {
    init_tracing();
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);
    session.mount().await.unwrap();

    wallet.grant(Ok(accounts(&[ALICE, BOB])));
    let outcome = session.connect().await.unwrap();

    assert_eq!(outcome, ConnectOutcome::Connected(accounts(&[ALICE, BOB])));
    let snapshot = session.snapshot();
    assert!(snapshot.is_connected());
    assert_eq!(snapshot.active_account(), Some(ALICE));
    assert_eq!(notes.all(), vec![accounts(&[ALICE, BOB])]);
}

#[tokio::test]
async fn disconnect_after_connect_clears_accounts() {
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);
    wallet.grant(Ok(accounts(&[ALICE])));
    session.connect().await.unwrap();

    session.disconnect();

    assert_eq!(session.snapshot().state(), &SessionState::Disconnected);
    assert!(session.snapshot().accounts().is_empty());
    assert_eq!(notes.all(), vec![accounts(&[ALICE]), accounts(&[])]);
    // The wallet keeps its authorization; nothing is sent to it.
    assert_eq!(wallet.request_calls(), 1);
}

#[tokio::test]
async fn empty_account_change_disconnects() {
    let wallet = MockWallet::installed().with_authorized(Ok(accounts(&[ALICE])));
    let (session, notes) = session_with(&wallet);
    session.mount().await.unwrap();

    wallet.emit(accounts(&[]));

    assert_eq!(session.snapshot().state(), &SessionState::Disconnected);
    assert_eq!(notes.all(), vec![accounts(&[ALICE]), accounts(&[])]);
}

#[tokio::test]
async fn account_change_switches_active_account() {
    let wallet = MockWallet::installed().with_authorized(Ok(accounts(&[ALICE])));
    let (session, notes) = session_with(&wallet);
    session.mount().await.unwrap();

    wallet.emit(accounts(&[BOB, ALICE]));

    assert_eq!(session.snapshot().active_account(), Some(BOB));
    assert_eq!(notes.count(), 2);
}

/// The wallet answers the connect prompt after the user already switched
/// accounts; the later account change must win.
#[tokio::test]
async fn stale_connect_does_not_overwrite_newer_accounts() {
    init_tracing();
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);
    session.mount().await.unwrap();

    let mut connect = pin!(session.connect());
    assert_eq!(poll!(connect.as_mut()), Poll::Pending);
    assert_eq!(wallet.pending_requests(), 1);

    wallet.emit(accounts(&[CAROL]));
    wallet.resolve_next(Ok(accounts(&[ALICE, BOB])));

    assert_eq!(connect.await, Ok(ConnectOutcome::Superseded));
    assert_eq!(session.snapshot().accounts(), accounts(&[CAROL]).as_slice());
    assert_eq!(notes.all(), vec![accounts(&[CAROL])]);
}

#[tokio::test]
async fn stale_connect_failure_is_dropped() {
    let wallet = MockWallet::installed();
    let (session, _notes) = session_with(&wallet);
    let mut connect = pin!(session.connect());
    assert_eq!(poll!(connect.as_mut()), Poll::Pending);

    wallet.emit(accounts(&[BOB]));
    session.disconnect();
    wallet.resolve_next(Err(ProviderError::user_rejected()));

    assert_eq!(connect.await, Ok(ConnectOutcome::Superseded));
    assert_eq!(session.last_error(), None);
    assert!(!session.snapshot().is_connected());
}

#[tokio::test]
async fn connect_without_provider_fails_without_calls() {
    init_tracing();
    let wallet = MockWallet::absent();
    let (session, notes) = session_with(&wallet);

    session.mount().await.unwrap();
    let err = session.connect().await.unwrap_err();

    assert_eq!(err, SessionError::ProviderNotInstalled);
    assert!(!err.to_string().is_empty());
    assert_eq!(session.last_error(), Some(SessionError::ProviderNotInstalled));
    assert_eq!(session.snapshot().state(), &SessionState::Disconnected);
    assert_eq!(wallet.total_calls(), 0);
    assert_eq!(notes.count(), 0);
}

#[tokio::test]
async fn second_connect_while_pending_is_coalesced() {
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);

    let mut first = pin!(session.connect());
    assert_eq!(poll!(first.as_mut()), Poll::Pending);
    assert!(session.is_connect_pending());

    assert_eq!(session.connect().await, Ok(ConnectOutcome::AlreadyPending));
    assert_eq!(wallet.request_calls(), 1);

    wallet.resolve_next(Ok(accounts(&[ALICE])));
    assert_eq!(first.await, Ok(ConnectOutcome::Connected(accounts(&[ALICE]))));
    assert!(!session.is_connect_pending());
    assert_eq!(notes.count(), 1);
}

#[tokio::test]
async fn dropped_connect_releases_pending_flag() {
    let wallet = MockWallet::installed();
    let (session, _notes) = session_with(&wallet);

    {
        let mut connect = pin!(session.connect());
        assert_eq!(poll!(connect.as_mut()), Poll::Pending);
        assert!(session.is_connect_pending());
    }

    assert!(!session.is_connect_pending());
    wallet.grant(Ok(accounts(&[ALICE])));
    assert_eq!(
        session.connect().await,
        Ok(ConnectOutcome::Connected(accounts(&[ALICE])))
    );
}

#[tokio::test]
async fn rejected_connect_surfaces_error_without_retry() {
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);
    wallet.grant(Err(ProviderError::user_rejected()));

    let err = session.connect().await.unwrap_err();

    assert_eq!(
        err,
        SessionError::AuthorizationFailed("User rejected the request.".into())
    );
    assert_eq!(
        err.to_string(),
        "Failed to connect wallet: User rejected the request."
    );
    assert_eq!(wallet.request_calls(), 1);
    assert!(!session.snapshot().is_connected());
    assert_eq!(notes.count(), 0);

    // Succeeding later clears the message.
    wallet.grant(Ok(accounts(&[ALICE])));
    session.connect().await.unwrap();
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn connect_with_no_accounts_is_an_authorization_failure() {
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);
    wallet.grant(Ok(Vec::new()));

    let err = session.connect().await.unwrap_err();

    assert_eq!(
        err,
        SessionError::AuthorizationFailed("wallet returned no accounts".into())
    );
    assert!(!session.snapshot().is_connected());
    assert_eq!(notes.count(), 0);
}

#[tokio::test]
async fn account_change_clears_previous_error() {
    let wallet = MockWallet::installed();
    let (session, _notes) = session_with(&wallet);
    session.mount().await.unwrap();
    wallet.grant(Err(ProviderError::user_rejected()));
    let _ = session.connect().await;
    assert!(session.last_error().is_some());

    wallet.emit(accounts(&[ALICE]));

    assert_eq!(session.last_error(), None);
    assert!(session.snapshot().is_connected());
}

#[tokio::test]
async fn teardown_unsubscribes_and_ignores_late_events() {
    init_tracing();
    let wallet = MockWallet::installed();
    let (session, notes) = session_with(&wallet);
    session.mount().await.unwrap();
    assert_eq!(wallet.listener_count(), 1);

    let mut connect = pin!(session.connect());
    assert_eq!(poll!(connect.as_mut()), Poll::Pending);

    session.teardown();
    assert!(session.is_closed());
    assert_eq!(wallet.listener_count(), 0);

    wallet.resolve_next(Ok(accounts(&[ALICE])));
    assert_eq!(connect.await, Ok(ConnectOutcome::Closed));

    session.accounts_changed(accounts(&[BOB]));
    session.disconnect();
    assert_eq!(session.snapshot().state(), &SessionState::Disconnected);
    assert_eq!(notes.count(), 0);

    let calls = wallet.total_calls();
    assert_eq!(session.connect().await, Ok(ConnectOutcome::Closed));
    session.mount().await.unwrap();
    assert_eq!(wallet.total_calls(), calls);
}

#[tokio::test]
async fn dropping_last_handle_unsubscribes() {
    let wallet = MockWallet::installed();
    {
        let (session, _notes) = session_with(&wallet);
        session.mount().await.unwrap();
        assert_eq!(wallet.listener_count(), 1);
    }
    assert_eq!(wallet.listener_count(), 0);
    wallet.emit(accounts(&[ALICE]));
}

#[tokio::test]
async fn observer_calling_back_into_session_sees_final_state() {
    let wallet = MockWallet::installed().with_authorized(Ok(accounts(&[ALICE])));
    let (session, notes) = session_with(&wallet);
    let handle = session.clone();
    session.observe(move |list| {
        if list.first().map(String::as_str) == Some(BOB) {
            handle.disconnect();
        }
    });
    session.mount().await.unwrap();

    wallet.emit(accounts(&[BOB]));

    assert_consistent(&session);
    assert_eq!(session.snapshot().state(), &SessionState::Disconnected);
    assert_eq!(notes.all().last(), Some(&accounts(&[])));
}
