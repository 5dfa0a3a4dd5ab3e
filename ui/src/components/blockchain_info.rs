use dioxus::prelude::*;

use chainboard_common::chain::ChainInfo;
use chainboard_common::transfer::parse_address;

use super::injected::chain_client;
use super::shared_state::use_config;

#[derive(Clone, Debug, PartialEq)]
enum InfoState {
    Loading,
    Ready(ChainInfo),
    Failed(String),
}

/// Balance, network, latest block and gas price for `account`, refreshed on
/// the configured interval.
#[component]
pub fn BlockchainInfo(account: String) -> Element {
    let config = use_config();
    let mut state = use_signal(|| InfoState::Loading);
    #[cfg_attr(not(target_family = "wasm"), allow(unused_variables))]
    let interval_ms = u32::try_from(config.refresh_interval.as_millis()).unwrap_or(u32::MAX);

    use_future(move || {
        let account = account.clone();
        async move {
            let Some(address) = parse_address(&account) else {
                state.set(InfoState::Failed(format!("Not an Ethereum address: {account}")));
                return;
            };
            let client = chain_client();
            loop {
                match client.chain_info(address).await {
                    Ok(info) => state.set(InfoState::Ready(info)),
                    Err(err) => {
                        tracing::warn!(%err, "failed to fetch chain info");
                        state.set(InfoState::Failed(err.to_string()));
                    }
                }

                #[cfg(target_family = "wasm")]
                gloo_timers::future::TimeoutFuture::new(interval_ms).await;
                #[cfg(not(target_family = "wasm"))]
                std::future::pending::<()>().await;
            }
        }
    });

    let current = state.read().clone();

    rsx! {
        div { class: "blockchain-info",
            h3 { "Chain Info" }
            match current {
                InfoState::Loading => rsx! { div { class: "loading", "Loading..." } },
                InfoState::Failed(msg) => rsx! { div { class: "error-message", "{msg}" } },
                InfoState::Ready(info) => {
                    let balance = info.balance_display();
                    let network = info.network_display();
                    let block = info.block_number;
                    let gas = info.gas_price_display();
                    let updated = info.fetched_at_display();
                    rsx! {
                        div { class: "info-grid",
                            div { class: "info-item",
                                span { class: "info-label", "Balance" }
                                span { class: "info-value", "{balance}" }
                            }
                            div { class: "info-item",
                                span { class: "info-label", "Network" }
                                span { class: "info-value", "{network}" }
                            }
                            div { class: "info-item",
                                span { class: "info-label", "Latest Block" }
                                span { class: "info-value", "{block}" }
                            }
                            div { class: "info-item",
                                span { class: "info-label", "Gas Price" }
                                span { class: "info-value", "{gas}" }
                            }
                        }
                        p { class: "info-updated", "Updated at {updated} UTC" }
                    }
                }
            }
        }
    }
}
