use std::str::FromStr;

use alloy::primitives::{Address, AddressError};

/// Parse a user-entered address.
///
/// Surrounding whitespace and the `0x` prefix are optional. Single-case hex
/// is taken as is; mixed-case input must carry a valid EIP-55 checksum, the
/// same acceptance rules a browser wallet library applies.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{digits}"), None)
    } else {
        Ok(Address::from_str(digits)?)
    }
}

pub fn is_address(input: &str) -> bool {
    parse_address(input).is_ok()
}
