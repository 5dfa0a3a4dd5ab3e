use alloy_primitives::TxHash;
use dioxus::prelude::*;

use chainboard_common::chain::network_label;
use chainboard_common::transfer::{prepare_transfer, TransferForm};

use super::injected::chain_client;
use super::shared_state::use_config;

/// Native ETH transfer form. The wallet signs and picks gas.
#[component]
pub fn TransactionSender(account: String) -> Element {
    let config = use_config();
    let mut recipient = use_signal(String::new);
    let mut amount = use_signal(String::new);
    let mut sending = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut tx_hash = use_signal(|| None::<TxHash>);
    let mut chain_id = use_signal(|| None::<u64>);

    use_future(move || async move {
        match chain_client().chain_id().await {
            Ok(id) => chain_id.set(Some(id)),
            Err(err) => tracing::warn!(%err, "failed to fetch chain id"),
        }
    });

    let send = move |_: MouseEvent| {
        let form = TransferForm {
            recipient: recipient.read().clone(),
            amount: amount.read().clone(),
        };
        let request = match prepare_transfer(Some(account.as_str()), &form) {
            Ok(request) => request,
            Err(err) => {
                error.set(Some(err.to_string()));
                return;
            }
        };
        sending.set(true);
        error.set(None);
        tx_hash.set(None);
        spawn(async move {
            match chain_client().send_transaction(&request).await {
                Ok(hash) => {
                    tracing::info!(%hash, to = %request.to, "transaction sent");
                    tx_hash.set(Some(hash));
                }
                Err(err) => {
                    tracing::warn!(%err, "transaction failed");
                    error.set(Some(err.to_string()));
                }
            }
            sending.set(false);
        });
    };

    let is_sending = *sending.read();
    let network = chain_id.read().map(network_label);
    let error_msg = error.read().clone();
    let sent = tx_hash.read().map(|hash| (hash.to_string(), config.tx_url(&hash)));

    rsx! {
        div { class: "transaction-sender",
            h2 { "Send ETH" }
            match network {
                Some(network) => rsx! { div { class: "network-info", "Network: " span { "{network}" } } },
                None => rsx! {},
            }
            div { class: "form-group",
                label { "Recipient" }
                input {
                    r#type: "text",
                    placeholder: "0x...",
                    value: "{recipient}",
                    disabled: is_sending,
                    oninput: move |evt| recipient.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Amount (ETH)" }
                input {
                    r#type: "number",
                    placeholder: "0.0",
                    step: "0.001",
                    min: "0",
                    value: "{amount}",
                    disabled: is_sending,
                    oninput: move |evt| amount.set(evt.value()),
                }
            }
            button {
                class: "send-button",
                disabled: is_sending,
                onclick: send,
                if is_sending { "Sending..." } else { "Send" }
            }
            match error_msg {
                Some(msg) => rsx! { div { class: "error-message", "{msg}" } },
                None => rsx! {},
            }
            match sent {
                Some((hash, url)) => rsx! {
                    div { class: "success-message",
                        p { "Transaction sent!" }
                        p { class: "tx-hash",
                            "Hash: "
                            a { href: "{url}", target: "_blank", rel: "noopener noreferrer", "{hash}" }
                        }
                    }
                },
                None => rsx! {},
            }
        }
    }
}
