//! Bridge to the wallet the browser injects as `window.ethereum`.
//!
//! Every request goes through `ethereum.request({ method, params })`; account
//! changes arrive through `ethereum.on("accountsChanged", cb)`. Listener
//! closures are kept alive here until `removeListener` is called for them.

use chainboard_common::chain::ChainClient;
use chainboard_common::eip1193::Eip1193Wallet;

pub use imp::InjectedProvider;

/// Session-facing view of the injected wallet.
pub type BrowserWallet = Eip1193Wallet<InjectedProvider>;

pub fn browser_wallet() -> BrowserWallet {
    Eip1193Wallet::new(InjectedProvider::new())
}

pub fn chain_client() -> ChainClient<InjectedProvider> {
    ChainClient::new(InjectedProvider::new())
}

#[cfg(target_family = "wasm")]
mod imp {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use chainboard_common::eip1193::{Eip1193, RpcRequest, ACCOUNTS_CHANGED};
    use chainboard_common::provider::{AccountsListener, ProviderError, SubscriptionId};
    use chainboard_common::session::Account;
    use js_sys::{Function, Promise, Reflect};
    use serde::Serialize;
    use serde_json::Value;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    type Listener = Closure<dyn FnMut(JsValue)>;

    #[derive(Clone, Default)]
    pub struct InjectedProvider {
        listeners: Rc<RefCell<HashMap<SubscriptionId, Listener>>>,
        next_id: Rc<Cell<u64>>,
    }

    impl InjectedProvider {
        pub fn new() -> Self {
            Self::default()
        }
    }

    fn ethereum() -> Option<JsValue> {
        let window = web_sys::window()?;
        let provider = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if provider.is_undefined() || provider.is_null() {
            None
        } else {
            Some(provider)
        }
    }

    fn method(target: &JsValue, name: &str) -> Option<Function> {
        Reflect::get(target, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    /// EIP-1193 errors are objects carrying `code` and `message`.
    fn provider_error(err: JsValue) -> ProviderError {
        let code = Reflect::get(&err, &JsValue::from_str("code"))
            .ok()
            .and_then(|c| c.as_f64())
            .map(|c| c as i64);
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .or_else(|| err.as_string())
            .unwrap_or_else(|| format!("{err:?}"));
        ProviderError::new(code, message)
    }

    fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ProviderError> {
        value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::other(format!("failed to encode request: {e}")))
    }

    impl Eip1193 for InjectedProvider {
        fn is_available(&self) -> bool {
            ethereum().is_some()
        }

        async fn request(&self, name: &str, params: Value) -> Result<Value, ProviderError> {
            let provider = ethereum().ok_or_else(ProviderError::not_installed)?;
            let request = method(&provider, "request")
                .ok_or_else(|| ProviderError::other("wallet provider has no request method"))?;

            let args = to_js(&RpcRequest { method: name, params })?;
            let promise: Promise = request
                .call1(&provider, &args)
                .map_err(provider_error)?
                .dyn_into()
                .map_err(|_| ProviderError::other("wallet request did not return a promise"))?;
            let result = JsFuture::from(promise).await.map_err(provider_error)?;

            if result.is_undefined() {
                return Ok(Value::Null);
            }
            serde_wasm_bindgen::from_value(result)
                .map_err(|e| ProviderError::other(format!("failed to read {name} response: {e}")))
        }

        fn on_accounts_changed(&self, listener: AccountsListener) -> SubscriptionId {
            let id = SubscriptionId(self.next_id.get());
            self.next_id.set(id.0 + 1);

            let callback: Listener = Closure::new(move |payload: JsValue| {
                match serde_wasm_bindgen::from_value::<Vec<Account>>(payload) {
                    Ok(accounts) => listener(accounts),
                    Err(err) => tracing::warn!(%err, "malformed accountsChanged payload"),
                }
            });

            if let Some(provider) = ethereum() {
                if let Some(on) = method(&provider, "on") {
                    let registered = on.call2(
                        &provider,
                        &JsValue::from_str(ACCOUNTS_CHANGED),
                        callback.as_ref().unchecked_ref(),
                    );
                    if let Err(err) = registered {
                        tracing::warn!(err = ?err, "failed to register accountsChanged listener");
                    }
                }
            }

            self.listeners.borrow_mut().insert(id, callback);
            id
        }

        fn remove_listener(&self, id: SubscriptionId) {
            let Some(callback) = self.listeners.borrow_mut().remove(&id) else {
                return;
            };
            let Some(provider) = ethereum() else { return };
            if let Some(remove) = method(&provider, "removeListener") {
                let _ = remove.call2(
                    &provider,
                    &JsValue::from_str(ACCOUNTS_CHANGED),
                    callback.as_ref().unchecked_ref(),
                );
            }
        }
    }
}

// Native builds have no injected wallet.
#[cfg(not(target_family = "wasm"))]
mod imp {
    use chainboard_common::eip1193::Eip1193;
    use chainboard_common::provider::{AccountsListener, ProviderError, SubscriptionId};
    use serde_json::Value;

    #[derive(Clone, Debug, Default)]
    pub struct InjectedProvider;

    impl InjectedProvider {
        pub fn new() -> Self {
            Self
        }
    }

    impl Eip1193 for InjectedProvider {
        fn is_available(&self) -> bool {
            false
        }

        async fn request(&self, _method: &str, _params: Value) -> Result<Value, ProviderError> {
            Err(ProviderError::not_installed())
        }

        fn on_accounts_changed(&self, _listener: AccountsListener) -> SubscriptionId {
            SubscriptionId(0)
        }

        fn remove_listener(&self, _id: SubscriptionId) {}
    }
}
