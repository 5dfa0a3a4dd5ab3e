use dioxus::prelude::*;

use super::blockchain_info::BlockchainInfo;
use super::contract_interaction::ContractInteraction;
use super::shared_state::{load_config, use_shared_state, SharedState};
use super::transaction_sender::TransactionSender;
use super::wallet_connect::WalletConnect;

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(SharedState::new()));
    use_context_provider(load_config);

    let shared = use_shared_state();
    let active = shared.read().active_account().map(str::to_string);

    rsx! {
        div { class: "app-container",
            header {
                h1 { "Chainboard" }
                WalletConnect {}
            }
            main {
                match active {
                    // Keyed by account so a switch remounts the panels and drops
                    // anything still in flight for the previous account.
                    Some(account) => rsx! {
                        div { class: "dashboard-grid",
                            div { class: "dashboard-item blockchain-info-container",
                                BlockchainInfo { key: "{account}", account: account.clone() }
                            }
                            div { class: "dashboard-item transaction-sender-container",
                                TransactionSender { key: "{account}", account: account.clone() }
                            }
                            div { class: "dashboard-item contract-interaction-container",
                                ContractInteraction { key: "{account}", account: account.clone() }
                            }
                        }
                    },
                    None => rsx! {
                        div { class: "connect-prompt",
                            h2 { "Welcome to Chainboard" }
                            p { "Connect your wallet to view chain data, send ETH and call contracts." }
                        }
                    },
                }
            }
        }
    }
}
