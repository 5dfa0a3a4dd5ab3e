use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::contract::PreparedCall;
use crate::eip1193::{
    call, Eip1193, RpcError, ETH_BLOCK_NUMBER, ETH_CALL, ETH_CHAIN_ID, ETH_GAS_PRICE,
    ETH_GET_BALANCE, ETH_SEND_TRANSACTION,
};
use crate::transfer::TransferRequest;

const LATEST: &str = "latest";

/// Snapshot of the chain as seen from the active account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    pub balance_wei: U256,
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price_wei: U256,
    pub fetched_at: DateTime<Utc>,
}

impl ChainInfo {
    /// Balance in ether, four decimals.
    pub fn balance_display(&self) -> String {
        format!("{} ETH", fixed_decimals(self.balance_wei, 18, 4))
    }

    /// Gas price in gwei, two decimals.
    pub fn gas_price_display(&self) -> String {
        format!("{} Gwei", fixed_decimals(self.gas_price_wei, 9, 2))
    }

    pub fn network_display(&self) -> String {
        network_label(self.chain_id)
    }

    pub fn fetched_at_display(&self) -> String {
        self.fetched_at.format("%H:%M:%S").to_string()
    }
}

/// Chain ids are shown as-is; names are not resolved.
pub fn network_label(chain_id: u64) -> String {
    format!("Chain ID: {chain_id}")
}

/// Render `value` (in units of 10^-`unit_decimals`) rounded to `places` decimals.
fn fixed_decimals(value: U256, unit_decimals: u8, places: usize) -> String {
    let Ok(formatted) = format_units(value, unit_decimals) else {
        return value.to_string();
    };
    match formatted.parse::<f64>() {
        Ok(amount) => format!("{amount:.places$}"),
        Err(_) => formatted,
    }
}

/// Chain queries and submissions routed through the wallet's provider.
#[derive(Clone, Debug)]
pub struct ChainClient<T> {
    transport: T,
}

impl<T: Eip1193> ChainClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        call(&self.transport, ETH_GET_BALANCE, json!([account, LATEST])).await
    }

    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U64 = call(&self.transport, ETH_CHAIN_ID, json!([])).await?;
        Ok(id.to::<u64>())
    }

    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let number: U64 = call(&self.transport, ETH_BLOCK_NUMBER, json!([])).await?;
        Ok(number.to::<u64>())
    }

    pub async fn gas_price(&self) -> Result<U256, RpcError> {
        call(&self.transport, ETH_GAS_PRICE, json!([])).await
    }

    /// Fetch everything the info panel shows, one request after another.
    pub async fn chain_info(&self, account: Address) -> Result<ChainInfo, RpcError> {
        let balance_wei = self.balance(account).await?;
        let chain_id = self.chain_id().await?;
        let block_number = self.block_number().await?;
        let gas_price_wei = self.gas_price().await?;
        debug!(chain_id, block_number, "fetched chain info");
        Ok(ChainInfo {
            balance_wei,
            chain_id,
            block_number,
            gas_price_wei,
            fetched_at: Utc::now(),
        })
    }

    /// Read-only contract call against the latest block.
    pub async fn call(&self, prepared: &PreparedCall) -> Result<Bytes, RpcError> {
        let tx = json!({
            "from": prepared.from,
            "to": prepared.to,
            "data": prepared.calldata,
        });
        call(&self.transport, ETH_CALL, json!([tx, LATEST])).await
    }

    /// Hand the transfer to the wallet, which signs and broadcasts it.
    pub async fn send_transaction(&self, request: &TransferRequest) -> Result<TxHash, RpcError> {
        let hash = call(&self.transport, ETH_SEND_TRANSACTION, json!([request])).await?;
        debug!(%hash, "transaction submitted");
        Ok(hash)
    }
}
