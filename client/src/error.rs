use ethbank_common::abi::AbiError;
use alloy::primitives::AddressError;
use ethbank_common::provider::ProviderError;
use ethbank_common::units::UnitsError;

use crate::interface::InterfaceError;

/// User input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid amount: {0}")]
    Amount(#[from] UnitsError),
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),
}

/// Everything a session operation can fail with. None of these are fatal:
/// the session stays usable and the user may retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("contract not initialized")]
    NotConnected,
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error(transparent)]
    Interface(#[from] InterfaceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Remote(#[from] ProviderError),
}

impl ClientError {
    /// Whether the failure happened before anything was sent to the wallet.
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::NotConnected | ClientError::Validation(_))
    }
}
