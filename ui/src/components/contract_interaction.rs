use dioxus::prelude::*;

use chainboard_common::contract::{decode_result, prepare_call, ContractCallForm};

use super::injected::chain_client;

/// Read-only contract call against a user-supplied ABI.
#[component]
pub fn ContractInteraction(account: String) -> Element {
    let mut address = use_signal(String::new);
    let mut abi = use_signal(String::new);
    let mut method = use_signal(String::new);
    let mut params = use_signal(String::new);
    let mut loading = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut output = use_signal(|| None::<String>);

    let call = move |_: MouseEvent| {
        let form = ContractCallForm {
            address: address.read().clone(),
            abi: abi.read().clone(),
            method: method.read().clone(),
            params: params.read().clone(),
        };
        let prepared = match prepare_call(Some(account.as_str()), &form) {
            Ok(prepared) => prepared,
            Err(err) => {
                error.set(Some(err.to_string()));
                return;
            }
        };
        loading.set(true);
        error.set(None);
        output.set(None);
        spawn(async move {
            let rendered = match chain_client().call(&prepared).await {
                Ok(data) => decode_result(&prepared, &data)
                    .map_err(|e| e.to_string())
                    .and_then(|value| serde_json::to_string_pretty(&value).map_err(|e| e.to_string())),
                Err(err) => Err(err.to_string()),
            };
            match rendered {
                Ok(json) => output.set(Some(json)),
                Err(msg) => {
                    tracing::warn!(method = %prepared.function.name, %msg, "contract call failed");
                    error.set(Some(msg));
                }
            }
            loading.set(false);
        });
    };

    let is_loading = *loading.read();
    let error_msg = error.read().clone();
    let result = output.read().clone();

    rsx! {
        div { class: "contract-interaction",
            h2 { "Contract Call" }
            div { class: "form-group",
                label { "Contract address" }
                input {
                    r#type: "text",
                    placeholder: "0x...",
                    value: "{address}",
                    oninput: move |evt| address.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "ABI (JSON)" }
                textarea {
                    placeholder: "[{{\"type\":\"function\", ...}}]",
                    value: "{abi}",
                    oninput: move |evt| abi.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Method" }
                input {
                    r#type: "text",
                    placeholder: "balanceOf",
                    value: "{method}",
                    oninput: move |evt| method.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Parameters (comma separated)" }
                input {
                    r#type: "text",
                    value: "{params}",
                    oninput: move |evt| params.set(evt.value()),
                }
            }
            button {
                class: "call-button",
                disabled: is_loading,
                onclick: call,
                if is_loading { "Calling..." } else { "Call" }
            }
            match error_msg {
                Some(msg) => rsx! { div { class: "error-message", "{msg}" } },
                None => rsx! {},
            }
            match result {
                Some(json) => rsx! {
                    div { class: "result-container",
                        h3 { "Result" }
                        pre { "{json}" }
                    }
                },
                None => rsx! {},
            }
        }
    }
}
