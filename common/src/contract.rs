//! Read-only contract calls built from a user-supplied ABI.
//!
//! The form carries the contract address, its ABI as JSON, a method name and a
//! comma-separated argument list. [`prepare_call`] validates all of it and
//! produces the calldata for `eth_call`; [`decode_result`] turns the returned
//! bytes back into JSON for display.

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi, Param};
use alloy_primitives::{hex, Address, Bytes};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::transfer::parse_address;

/// Decoded return value, ready to pretty-print.
pub type ContractOutput = Value;

/// Raw input of the contract call form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractCallForm {
    pub address: String,
    pub abi: String,
    pub method: String,
    pub params: String,
}

/// A validated call, ready for `eth_call`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedCall {
    pub from: Address,
    pub to: Address,
    pub function: Function,
    pub calldata: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("Please connect your wallet first")]
    NotConnected,
    #[error("Please provide the contract address, ABI and method name")]
    MissingFields,
    #[error("Invalid ABI format")]
    InvalidAbi(String),
    #[error("Invalid contract address")]
    InvalidAddress,
    #[error("Connected account is not a valid Ethereum address: {0}")]
    InvalidSender(String),
    #[error("Method not found in contract: {0}")]
    UnknownMethod(String),
    #[error("{method} expects {expected} parameter(s), got {got}")]
    ArgumentCount {
        method: String,
        expected: String,
        got: usize,
    },
    #[error("Invalid value for parameter {param}: {reason}")]
    InvalidArgument { param: String, reason: String },
    #[error("Failed to encode call: {0}")]
    Encode(String),
    #[error("Failed to decode result: {0}")]
    Decode(String),
}

/// Validate the form and encode the call on behalf of `from`.
pub fn prepare_call(from: Option<&str>, form: &ContractCallForm) -> Result<PreparedCall, ContractError> {
    let from = from.ok_or(ContractError::NotConnected)?;

    let address = form.address.trim();
    let abi = form.abi.trim();
    let method = form.method.trim();
    if address.is_empty() || abi.is_empty() || method.is_empty() {
        return Err(ContractError::MissingFields);
    }

    let abi: JsonAbi =
        serde_json::from_str(abi).map_err(|err| ContractError::InvalidAbi(err.to_string()))?;
    let to = parse_address(address).ok_or(ContractError::InvalidAddress)?;
    let overloads = abi
        .function(method)
        .filter(|funcs| !funcs.is_empty())
        .ok_or_else(|| ContractError::UnknownMethod(method.to_string()))?;

    let args = split_params(&form.params);
    let function = select_overload(method, overloads, args.len())?;
    let values = coerce_args(&function.inputs, &args)?;
    let calldata = function
        .abi_encode_input(&values)
        .map_err(|err| ContractError::Encode(err.to_string()))?;
    let from = parse_address(from).ok_or_else(|| ContractError::InvalidSender(from.to_string()))?;

    debug!(method, %to, signature = %function.signature(), "prepared contract call");
    Ok(PreparedCall {
        from,
        to,
        function: function.clone(),
        calldata: calldata.into(),
    })
}

/// Decode the raw `eth_call` result.
///
/// No outputs render as `null`, a single output as its value, several as an
/// object keyed by output name (or position, for unnamed outputs).
pub fn decode_result(call: &PreparedCall, data: &[u8]) -> Result<ContractOutput, ContractError> {
    let values = call
        .function
        .abi_decode_output(data)
        .map_err(|err| ContractError::Decode(err.to_string()))?;

    Ok(match values.as_slice() {
        [] => Value::Null,
        [single] => value_to_json(single),
        many => {
            let fields = call
                .function
                .outputs
                .iter()
                .zip(many)
                .enumerate()
                .map(|(i, (param, value))| (param_label(param, i), value_to_json(value)))
                .collect::<Map<_, _>>();
            Value::Object(fields)
        }
    })
}

/// Split a comma-separated argument list; blank input means no arguments.
fn split_params(params: &str) -> Vec<&str> {
    if params.trim().is_empty() {
        return Vec::new();
    }
    params.split(',').map(str::trim).collect()
}

fn select_overload<'a>(
    method: &str,
    overloads: &'a [Function],
    argc: usize,
) -> Result<&'a Function, ContractError> {
    overloads
        .iter()
        .find(|func| func.inputs.len() == argc)
        .ok_or_else(|| {
            let expected = overloads
                .iter()
                .map(|func| func.inputs.len().to_string())
                .collect::<Vec<_>>()
                .join(" or ");
            ContractError::ArgumentCount {
                method: method.to_string(),
                expected,
                got: argc,
            }
        })
}

fn coerce_args(inputs: &[Param], args: &[&str]) -> Result<Vec<DynSolValue>, ContractError> {
    inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (param, arg))| {
            let invalid = |reason: String| ContractError::InvalidArgument {
                param: param_label(param, i),
                reason,
            };
            let ty = DynSolType::parse(&param.selector_type()).map_err(|e| invalid(e.to_string()))?;
            ty.coerce_str(arg).map_err(|e| invalid(e.to_string()))
        })
        .collect()
}

fn param_label(param: &Param, index: usize) -> String {
    if param.name.is_empty() {
        index.to_string()
    } else {
        param.name.clone()
    }
}

#[allow(unreachable_patterns)]
fn value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Address(addr) => Value::String(addr.to_checksum(None)),
        DynSolValue::Function(func) => Value::String(hex::encode_prefixed(func.as_slice())),
        DynSolValue::Bytes(bytes) => Value::String(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(value_to_json).collect())
        }
        _ => Value::Null,
    }
}
