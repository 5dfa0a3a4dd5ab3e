use std::time::Duration;

use alloy_primitives::TxHash;
use thiserror::Error;
use tracing::warn;

use crate::transfer::explorer_tx_url;

pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_EXPLORER_URL: &str = "https://etherscan.io";

/// Query-string key for the refresh interval, in seconds.
pub const REFRESH_KEY: &str = "refresh";
/// Query-string key for the block explorer base URL.
pub const EXPLORER_KEY: &str = "explorer";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("refresh interval must be a whole number of seconds, got {0:?}")]
    InvalidRefresh(String),
    #[error("refresh interval must be at least 1 second")]
    RefreshTooShort,
    #[error("explorer URL must start with http:// or https://, got {0:?}")]
    InvalidExplorer(String),
    #[error("unknown setting {0:?}")]
    UnknownKey(String),
}

/// Dashboard settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DappConfig {
    /// How often the chain info panel refetches.
    pub refresh_interval: Duration,
    /// Block explorer base, without trailing slash.
    pub explorer_url: String,
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

impl DappConfig {
    /// Defaults, overridden at compile time via `CHAINBOARD_REFRESH_SECS` and
    /// `CHAINBOARD_EXPLORER_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides([
            (REFRESH_KEY, option_env!("CHAINBOARD_REFRESH_SECS")),
            (EXPLORER_KEY, option_env!("CHAINBOARD_EXPLORER_URL")),
        ]);
        config
    }

    /// Apply each present override, logging and skipping invalid ones.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        for (key, value) in overrides {
            let Some(value) = value else { continue };
            if let Err(err) = self.override_from(key, value) {
                warn!(key, value, %err, "ignoring config override");
            }
        }
    }

    /// Set one setting from its string form. On error the current value is kept.
    pub fn override_from(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            REFRESH_KEY => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidRefresh(value.to_string()))?;
                if secs < 1 {
                    return Err(ConfigError::RefreshTooShort);
                }
                self.refresh_interval = Duration::from_secs(secs);
            }
            EXPLORER_KEY => {
                if !(value.starts_with("https://") || value.starts_with("http://")) {
                    return Err(ConfigError::InvalidExplorer(value.to_string()));
                }
                self.explorer_url = value.trim_end_matches('/').to_string();
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn tx_url(&self, hash: &TxHash) -> String {
        explorer_tx_url(&self.explorer_url, hash)
    }
}
