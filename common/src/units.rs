//! Decimal ether amounts as typed by users and shown in the event log.
//!
//! The conversion itself is `alloy`'s; this module adds the input rules a
//! wallet form applies (plain decimals only) and the trimmed display form.

use alloy::primitives::utils;
use alloy::primitives::U256;

/// Fractional digits between ether and wei.
pub const ETHER_DECIMALS: usize = 18;

/// Why a decimal amount string could not be converted to wei.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("`{0}` must not be negative")]
    Negative(String),
    #[error("`{0}` has more than 18 decimal places")]
    TooPrecise(String),
    #[error("`{0}` is too large")]
    Overflow(String),
}

/// Decimal ether string to wei.
///
/// Accepts `123`, `1.5`, `.5` and `2.`; rejects signs, exponents, and more
/// than 18 fractional digits.
pub fn parse_ether(input: &str) -> Result<U256, UnitsError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }
    if s.starts_with('-') {
        return Err(UnitsError::Negative(input.to_string()));
    }

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(UnitsError::NotANumber(input.to_string()));
    }
    if frac_part.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise(input.to_string()));
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let normalized = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    utils::parse_ether(&normalized).map_err(|_| UnitsError::Overflow(input.to_string()))
}

/// Wei to a decimal ether string with trailing fractional zeros trimmed
/// (`1500000000000000000` wei is `1.5`).
pub fn format_ether(value: U256) -> String {
    let full = utils::format_ether(value);
    match full.split_once('.') {
        Some((int_part, frac_part)) => {
            let frac_part = frac_part.trim_end_matches('0');
            if frac_part.is_empty() {
                int_part.to_string()
            } else {
                format!("{int_part}.{frac_part}")
            }
        }
        None => full,
    }
}

/// `1.5 ETH`
pub fn format_eth(value: U256) -> String {
    format!("{} ETH", format_ether(value))
}
