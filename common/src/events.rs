use std::fmt;

use alloy::primitives::{Address, B256, U256};

use crate::abi::{AbiError, EventValues};
use crate::provider::Log;
use crate::units::format_eth;

/// The two contract event streams the client follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Deposit,
    Transfer,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::Deposit, EventKind::Transfer];

    /// Event name as it appears in the interface description.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Deposit => "Deposit",
            EventKind::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of one log delivery: transaction hash plus position in that
/// transaction's receipt logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub tx_hash: B256,
    pub log_index: u64,
}

impl EventKey {
    /// `None` for pending logs, which carry no position yet.
    pub fn of(log: &Log) -> Option<Self> {
        Some(Self {
            tx_hash: log.transaction_hash?,
            log_index: log.log_index?,
        })
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tx_hash, self.log_index)
    }
}

/// A decoded bank contract event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankEvent {
    Deposit {
        sender: Address,
        amount: U256,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
}

impl BankEvent {
    /// Pick the named values for `kind` out of a decoded log.
    pub fn from_values(kind: EventKind, values: &EventValues) -> Result<Self, AbiError> {
        Ok(match kind {
            EventKind::Deposit => BankEvent::Deposit {
                sender: values.address("sender")?,
                amount: values.uint("amount")?,
            },
            EventKind::Transfer => BankEvent::Transfer {
                from: values.address("from")?,
                to: values.address("to")?,
                amount: values.uint("amount")?,
            },
        })
    }
}

impl fmt::Display for BankEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankEvent::Deposit { sender, amount } => {
                write!(f, "Deposit: {sender} deposited {}", format_eth(*amount))
            }
            BankEvent::Transfer { from, to, amount } => {
                write!(f, "Transfer: {from} → {to} ({})", format_eth(*amount))
            }
        }
    }
}
