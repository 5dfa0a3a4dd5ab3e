use dioxus::prelude::*;

use chainboard_common::config::DappConfig;
use chainboard_common::session::Account;

/// Wallet state shared with the dashboard.
///
/// Written only by the wallet session's observer; every other component reads
/// it as a snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedState {
    /// Accounts granted by the wallet; empty while disconnected.
    pub accounts: Vec<Account>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_account(&self) -> Option<&str> {
        self.accounts.first().map(String::as_str)
    }
}

pub fn use_shared_state() -> Signal<SharedState> {
    use_context::<Signal<SharedState>>()
}

pub fn use_config() -> DappConfig {
    use_context::<DappConfig>()
}

/// Compile-time settings, overridden by `?refresh=<secs>&explorer=<url>`.
pub fn load_config() -> DappConfig {
    #[allow(unused_mut)]
    let mut config = DappConfig::from_env();

    #[cfg(target_family = "wasm")]
    {
        use chainboard_common::config::{EXPLORER_KEY, REFRESH_KEY};

        let params = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .and_then(|qs| web_sys::UrlSearchParams::new_with_str(&qs).ok());
        if let Some(params) = params {
            let refresh = params.get(REFRESH_KEY);
            let explorer = params.get(EXPLORER_KEY);
            config.apply_overrides([
                (REFRESH_KEY, refresh.as_deref()),
                (EXPLORER_KEY, explorer.as_deref()),
            ]);
        }
    }

    tracing::debug!(?config, "dashboard config loaded");
    config
}
