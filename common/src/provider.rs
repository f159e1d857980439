use std::fmt;

use alloy::primitives::{Address, Bytes, B256, U256};
use futures::stream::BoxStream;

pub use alloy::rpc::types::{Filter, Log, TransactionRequest};

/// Identifier of a live push subscription.
pub type SubscriptionId = B256;

/// Deliveries of one log subscription. An `Err` item reports a stream-level
/// failure; providers end the stream after it.
pub type LogStream = BoxStream<'static, Result<Log, ProviderError>>;

/// A live push-stream registration.
pub struct Subscription {
    pub id: SubscriptionId,
    pub logs: LogStream,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Errors from wallet/node operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The user (or wallet) declined the request (EIP-1193 code 4001).
    #[error("request rejected by user")]
    Rejected,
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("subscription closed: {0}")]
    SubscriptionClosed(String),
    #[error("unknown account {0}")]
    UnknownAccount(Address),
}

impl ProviderError {
    /// JSON-RPC "method not found".
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED: i64 = 4001;

    /// Build from a JSON-RPC error object, mapping the EIP-1193 rejection code.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == Self::USER_REJECTED {
            Self::Rejected
        } else {
            Self::Rpc {
                code,
                message: message.into(),
            }
        }
    }

    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == Self::METHOD_NOT_FOUND)
    }
}

/// Abstraction over the wallet capability: account authorization, transaction
/// submission, read-only calls and log push-streams.
///
/// Maps to the client's operations:
/// - `connect`          → `request_accounts`
/// - `deposit`/`transfer` → `accounts` + `send_transaction`
/// - `get_balance`      → `call`
/// - event relay        → `subscribe_logs` / `unsubscribe`
#[allow(async_fn_in_trait)]
pub trait Provider {
    /// Ask the wallet to authorize accounts for this client.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Accounts already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Sign and submit a state-changing transaction. Returns its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, ProviderError>;

    /// Execute a read-only call against the latest block.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError>;

    /// Register a log push-stream starting at the chain head.
    async fn subscribe_logs(&self, filter: Filter) -> Result<Subscription, ProviderError>;

    /// Cancel a push-stream.
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ProviderError>;

    /// Native currency balance of an account, in wei.
    async fn balance(&self, account: Address) -> Result<U256, ProviderError>;

    /// Human-readable provider name (e.g. "json-rpc", "local-key").
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_mapping() {
        assert_eq!(ProviderError::from_rpc(4001, "User denied"), ProviderError::Rejected);
        let nf = ProviderError::from_rpc(-32601, "the method eth_requestAccounts does not exist");
        assert!(nf.is_method_not_found());
        assert_eq!(
            ProviderError::from_rpc(3, "execution reverted").to_string(),
            "rpc error 3: execution reverted"
        );
    }
}
