// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Blocks and transactions as consumed by the balance ledger
//!
//! The upstream proxy returns every quantity as a `0x`-prefixed hex string.
//! [`RawBlock`] mirrors that wire shape and is converted into the typed
//! [`Block`] with [`TryFrom`], failing with
//! [`ProviderError::MalformedResponse`] on anything unparsable.

use std::str::FromStr;

use alloy_primitives::{Address, BlockNumber, TxHash, U256};
use serde::Deserialize;

use crate::errors::ProviderError;

/// A value transfer between two optional accounts
///
/// `from` is absent for mint-like transactions, `to` is absent for contract
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sender, if any
    pub from: Option<Address>,
    /// Recipient, if any
    pub to: Option<Address>,
    /// Transferred amount in wei
    pub value: U256,
    /// Transaction hash, kept for diagnostics
    pub hash: Option<TxHash>,
}

impl Transaction {
    /// Create a transaction without a hash
    pub fn new(from: Option<Address>, to: Option<Address>, value: U256) -> Self {
        Self {
            from,
            to,
            value,
            hash: None,
        }
    }
}

/// A block at a given height with its ordered transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block height
    pub number: BlockNumber,
    /// Transactions in block order (possibly empty)
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block
    pub fn new(number: BlockNumber, transactions: Vec<Transaction>) -> Self {
        Self {
            number,
            transactions,
        }
    }
}

/// Wire shape of a transaction object returned by `eth_getBlockByNumber`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    pub value: String,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Wire shape of a block returned by `eth_getBlockByNumber` with full transactions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub number: String,
    #[serde(default)]
    pub transactions: Option<Vec<RawTransaction>>,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = ProviderError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Ok(Self {
            from: parse_optional_address("from", raw.from.as_deref())?,
            to: parse_optional_address("to", raw.to.as_deref())?,
            value: parse_hex_u256("value", &raw.value)?,
            hash: raw
                .hash
                .as_deref()
                .map(|hash| {
                    TxHash::from_str(hash).map_err(|e| {
                        ProviderError::malformed_response(format!("invalid hash {hash:?}: {e}"))
                    })
                })
                .transpose()?,
        })
    }
}

impl TryFrom<RawBlock> for Block {
    type Error = ProviderError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let number = parse_hex_u64("number", &raw.number)?;
        let transactions = raw
            .transactions
            .unwrap_or_default()
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            number,
            transactions,
        })
    }
}

/// Strip the `0x` prefix of a hex quantity, rejecting empty digit strings.
fn hex_digits<'a>(field: &str, value: &'a str) -> Result<&'a str, ProviderError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err(ProviderError::malformed_response(format!(
            "{field} is not a hex quantity: {value:?}"
        )));
    }
    Ok(digits)
}

/// Parse a hex quantity such as `"0x1b4"` into a `u64`.
///
/// # Examples
///
/// ```
/// use deltascan::parse_hex_u64;
///
/// assert_eq!(parse_hex_u64("number", "0x1b4").unwrap(), 436);
/// assert!(parse_hex_u64("number", "latest").is_err());
/// ```
pub fn parse_hex_u64(field: &str, value: &str) -> Result<u64, ProviderError> {
    let digits = hex_digits(field, value)?;
    u64::from_str_radix(digits, 16).map_err(|e| {
        ProviderError::malformed_response(format!("{field} is not a hex quantity: {value:?} ({e})"))
    })
}

/// Parse a hex quantity into a `U256`.
pub fn parse_hex_u256(field: &str, value: &str) -> Result<U256, ProviderError> {
    let digits = hex_digits(field, value)?;
    U256::from_str_radix(digits, 16).map_err(|e| {
        ProviderError::malformed_response(format!("{field} is not a hex quantity: {value:?} ({e})"))
    })
}

/// Parse an optional address; `null` and `""` both mean absent.
fn parse_optional_address(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Address>, ProviderError> {
    match value {
        None | Some("") => Ok(None),
        Some(address) => Address::from_str(address).map(Some).map_err(|e| {
            ProviderError::malformed_response(format!("{field} is not an address: {address:?} ({e})"))
        }),
    }
}
