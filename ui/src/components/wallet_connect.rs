use dioxus::prelude::*;

use chainboard_common::session::short_account;
use chainboard_common::wallet_session::{ConnectOutcome, WalletSession};

use super::injected::{browser_wallet, BrowserWallet};
use super::shared_state::use_shared_state;

/// Connect/disconnect control. Owns the page's wallet session and mirrors its
/// account list into [`SharedState`](super::shared_state::SharedState).
#[component]
pub fn WalletConnect() -> Element {
    let mut shared = use_shared_state();
    let mut error = use_signal(|| None::<String>);
    let mut connecting = use_signal(|| false);

    let session: WalletSession<BrowserWallet> = use_hook(|| {
        let session = WalletSession::new(browser_wallet());
        session.observe(move |accounts| {
            // The session drops its error once it is connected.
            if !accounts.is_empty() {
                error.set(None);
            }
            shared.write().accounts = accounts.to_vec();
        });
        session
    });

    // Subscribe to accountsChanged and pick up an existing authorization.
    use_future({
        let session = session.clone();
        move || {
            let session = session.clone();
            async move {
                if let Err(err) = session.mount().await {
                    error.set(Some(err.to_string()));
                }
            }
        }
    });

    use_drop({
        let session = session.clone();
        move || session.teardown()
    });

    let on_connect = {
        let session = session.clone();
        move |_: MouseEvent| {
            let session = session.clone();
            connecting.set(true);
            spawn(async move {
                let outcome = session.connect().await;
                if !matches!(outcome, Ok(ConnectOutcome::AlreadyPending)) {
                    connecting.set(false);
                }
                error.set(session.last_error().map(|e| e.to_string()));
            });
        }
    };

    let on_disconnect = {
        let session = session.clone();
        move |_: MouseEvent| {
            session.disconnect();
            error.set(None);
        }
    };

    let active = shared.read().active_account().map(str::to_string);
    let is_connecting = *connecting.read();
    let error_msg = error.read().clone();

    rsx! {
        div { class: "wallet-connect",
            match active {
                Some(account) => {
                    let short = short_account(&account);
                    rsx! {
                        div { class: "account-info",
                            span { class: "account-address", title: "{account}", "{short}" }
                            button { class: "disconnect-button", onclick: on_disconnect, "Disconnect" }
                        }
                    }
                }
                None => rsx! {
                    button {
                        class: "connect-button",
                        disabled: is_connecting,
                        onclick: on_connect,
                        if is_connecting { "Connecting..." } else { "Connect Wallet" }
                    }
                },
            }
            match error_msg {
                Some(msg) => rsx! { div { class: "error-message", "{msg}" } },
                None => rsx! {},
            }
        }
    }
}
