// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Exact amounts of native currency
//!
//! Net balance changes can exceed any machine word, so amounts are held as
//! integer [`BigDecimal`]s (scale 0) and every display unit is produced by
//! shifting the decimal point of the same digit string. No floating point is
//! involved anywhere.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;

/// Decimals between wei and gwei (1 gwei = 10^9 wei)
pub const GWEI_DECIMALS: usize = 9;

/// Decimals between wei and ether (1 ETH = 10^18 wei)
pub const ETHER_DECIMALS: usize = 18;

/// Convert a `U256` to an integer `BigDecimal` without going through strings.
///
/// Limbs are folded most-significant first, so the result is exact for every
/// `U256` value.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use deltascan::u256_to_bigdecimal;
///
/// let max = u256_to_bigdecimal(U256::MAX);
/// assert_eq!(max.to_string(), U256::MAX.to_string());
/// ```
pub fn u256_to_bigdecimal(value: U256) -> BigDecimal {
    let limb_base = BigDecimal::from(u64::MAX) + BigDecimal::from(1u64);
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(BigDecimal::from(0u64), |acc, limb| {
            acc * &limb_base + BigDecimal::from(*limb)
        })
}

/// A non-negative amount of native currency, in wei, of arbitrary size
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use deltascan::NativeAmount;
///
/// let amount = NativeAmount::from(U256::from(1_500_000_000_000_000_000u128));
/// assert_eq!(amount.wei(), "1500000000000000000");
/// assert_eq!(amount.gwei(), "1500000000");
/// assert_eq!(amount.ether(), "1.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeAmount(BigDecimal);

impl NativeAmount {
    /// Zero wei
    pub fn zero() -> Self {
        Self(BigDecimal::from(0u64))
    }

    /// Wrap the magnitude of an integer-valued `BigDecimal`
    ///
    /// The sign is dropped and any fractional part is truncated, so the
    /// result is always a whole, non-negative number of wei.
    pub fn from_magnitude(value: &BigDecimal) -> Self {
        Self(value.abs().with_scale(0))
    }

    /// The exact value in wei
    pub fn as_wei(&self) -> &BigDecimal {
        &self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::from(0u64)
    }

    /// Exact decimal string in wei
    pub fn wei(&self) -> String {
        self.0.to_string()
    }

    /// Exact decimal string in gwei, trailing zeros trimmed
    ///
    /// ```
    /// use alloy_primitives::U256;
    /// use deltascan::NativeAmount;
    ///
    /// let amount = NativeAmount::from(U256::from(30_500_000_000u64));
    /// assert_eq!(amount.gwei(), "30.5");
    /// ```
    pub fn gwei(&self) -> String {
        shift_decimal_point(&self.wei(), GWEI_DECIMALS)
    }

    /// Exact decimal string in ether, trailing zeros trimmed
    pub fn ether(&self) -> String {
        shift_decimal_point(&self.wei(), ETHER_DECIMALS)
    }
}

impl Default for NativeAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<U256> for NativeAmount {
    fn from(value: U256) -> Self {
        Self(u256_to_bigdecimal(value))
    }
}

impl From<u64> for NativeAmount {
    fn from(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl std::fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

/// Divide a decimal digit string by `10^decimals`, keeping every digit.
///
/// Always decimal notation, never scientific notation.
pub(crate) fn shift_decimal_point(digits: &str, decimals: usize) -> String {
    if decimals == 0 {
        return digits.to_string();
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fractional) = padded.split_at(padded.len() - decimals);
    let trimmed = fractional.trim_end_matches('0');

    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn u256_conversion_is_exact() {
        assert_eq!(u256_to_bigdecimal(U256::ZERO), BigDecimal::from(0u64));
        assert_eq!(u256_to_bigdecimal(U256::from(12345u64)), BigDecimal::from(12345u64));

        let two_pow_64 = U256::from(u64::MAX) + U256::from(1u64);
        assert_eq!(
            u256_to_bigdecimal(two_pow_64),
            BigDecimal::from_str("18446744073709551616").unwrap()
        );

        let max = u256_to_bigdecimal(U256::MAX);
        assert_eq!(max, BigDecimal::from_str(&U256::MAX.to_string()).unwrap());
    }

    #[test]
    fn zero_amount() {
        let zero = NativeAmount::zero();
        assert!(zero.is_zero());
        assert_eq!(zero.wei(), "0");
        assert_eq!(zero.gwei(), "0");
        assert_eq!(zero.ether(), "0");
    }

    #[test]
    fn from_magnitude_drops_sign() {
        let amount = NativeAmount::from_magnitude(&BigDecimal::from(-100i64));
        assert_eq!(amount.wei(), "100");
        assert!(!amount.is_zero());
    }

    #[test]
    fn whole_ether() {
        let amount = NativeAmount::from(U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(amount.ether(), "1");
        assert_eq!(amount.gwei(), "1000000000");
    }

    #[test]
    fn tiny_amount_keeps_every_digit() {
        let amount = NativeAmount::from(100u64);
        assert_eq!(amount.wei(), "100");
        assert_eq!(amount.gwei(), "0.0000001");
        assert_eq!(amount.ether(), "0.0000000000000001");
    }

    #[test]
    fn fractional_ether_trims_trailing_zeros() {
        let amount = NativeAmount::from(U256::from(1_200_000_000_000_000_000u128));
        assert_eq!(amount.ether(), "1.2");

        let amount = NativeAmount::from(U256::from(123_456_789_012_345_678u128));
        assert_eq!(amount.ether(), "0.123456789012345678");
    }

    #[test]
    fn amounts_beyond_u256_still_format() {
        let huge = u256_to_bigdecimal(U256::MAX) * BigDecimal::from(10u64);
        let amount = NativeAmount::from_magnitude(&huge);
        let expected_wei = format!("{}0", U256::MAX);
        assert_eq!(amount.wei(), expected_wei);
        assert_eq!(
            amount.ether(),
            shift_decimal_point(&expected_wei, ETHER_DECIMALS)
        );
        assert!(!amount.ether().contains('E') && !amount.ether().contains('e'));
    }

    #[test]
    fn shift_decimal_point_edge_cases() {
        assert_eq!(shift_decimal_point("0", 9), "0");
        assert_eq!(shift_decimal_point("1", 9), "0.000000001");
        assert_eq!(shift_decimal_point("1000000000", 9), "1");
        assert_eq!(shift_decimal_point("1234567890", 9), "1.23456789");
        assert_eq!(shift_decimal_point("42", 0), "42");
    }

    #[test]
    fn ordering_follows_value() {
        let small = NativeAmount::from(100u64);
        let large = NativeAmount::from(1000u64);
        assert!(small < large);
    }
}
