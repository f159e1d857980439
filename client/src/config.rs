use alloy::primitives::address;
use ethbank_common::Address;

/// Deployed bank contract the client talks to by default.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("3E9e7e74945b844093335338eaf07F5Ed3737D5c");

/// Where the interface description is fetched from by default.
pub const DEFAULT_INTERFACE_PATH: &str = "static/abi.json";

/// Gas ceiling attached to every deposit.
pub const DEPOSIT_GAS_LIMIT: u64 = 300_000;

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub contract_address: Address,
    pub deposit_gas_limit: u64,
    /// Start the event relay as part of `connect`. One-shot command-line
    /// actions turn this off.
    pub subscribe_on_connect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            deposit_gas_limit: DEPOSIT_GAS_LIMIT,
            subscribe_on_connect: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address_matches_checksum_form() {
        assert_eq!(
            DEFAULT_CONTRACT_ADDRESS.to_string(),
            "0x3E9e7e74945b844093335338eaf07F5Ed3737D5c"
        );
    }
}
