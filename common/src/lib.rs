//! Types shared by the bank client and its front ends: the wallet capability
//! trait, contract interface helpers, event model and amount handling.

pub mod abi;
pub mod address;
pub mod events;
pub mod provider;
pub mod units;

pub use address::{is_address, parse_address};
pub use alloy::primitives::{Address, Bytes, B256, U256};
