use std::str::FromStr;

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw input of the transfer form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    /// Amount in ether, as typed.
    pub amount: String,
}

/// Native-asset transfer ready for `eth_sendTransaction`.
///
/// Nonce, gas and fees are left to the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    /// Value in wei.
    pub value: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Please connect your wallet first")]
    NotConnected,
    #[error("Please enter a recipient address and an amount")]
    MissingFields,
    #[error("Invalid Ethereum address")]
    InvalidRecipient,
    #[error("Connected account is not a valid Ethereum address: {0}")]
    InvalidSender(String),
    #[error("Invalid amount")]
    InvalidAmount(String),
}

/// Validate the form and build the request sent on behalf of `from`.
pub fn prepare_transfer(
    from: Option<&str>,
    form: &TransferForm,
) -> Result<TransferRequest, TransferError> {
    let from = from.ok_or(TransferError::NotConnected)?;

    let recipient = form.recipient.trim();
    let amount = form.amount.trim();
    if recipient.is_empty() || amount.is_empty() {
        return Err(TransferError::MissingFields);
    }

    let to = parse_address(recipient).ok_or(TransferError::InvalidRecipient)?;
    let from = parse_address(from).ok_or_else(|| TransferError::InvalidSender(from.to_string()))?;
    let value = parse_amount(amount).ok_or_else(|| TransferError::InvalidAmount(amount.to_string()))?;

    Ok(TransferRequest { from, to, value })
}

/// Parse a 20-byte hex address.
///
/// All-lowercase and all-uppercase inputs are accepted as-is; mixed case must
/// carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let hex = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X"))?;
    if hex.len() != 40 {
        return None;
    }
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{hex}"), None).ok()
    } else {
        Address::from_str(hex).ok()
    }
}

/// Non-negative decimal ether amount, in wei.
fn parse_amount(amount: &str) -> Option<U256> {
    if amount.starts_with('-') {
        return None;
    }
    parse_ether(amount).ok()
}

/// Block explorer link for a submitted transaction.
pub fn explorer_tx_url(explorer_url: &str, hash: &TxHash) -> String {
    format!("{}/tx/{hash}", explorer_url.trim_end_matches('/'))
}
