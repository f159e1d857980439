//! [`Provider`] backed by a node's JSON-RPC endpoints.
//!
//! Requests go over HTTP; log subscriptions open a WebSocket on first use.
//! With a local key, accounts and transaction signing stay on this machine
//! and the node only sees raw signed transactions.

use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider as _, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use futures::StreamExt;

use ethbank_common::provider::{
    Filter, Provider, ProviderError, Subscription, SubscriptionId, TransactionRequest,
};
use ethbank_common::{Address, Bytes, B256, U256};

use crate::pubsub::{connect_ws, ConnectionSlot};

/// Replace the scheme of an HTTP endpoint with its WebSocket counterpart.
pub fn derive_ws_url(rpc_url: &str) -> String {
    if let Some(rest) = rpc_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = rpc_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        rpc_url.to_string()
    }
}

/// JSON-RPC error objects keep their code; everything else is a transport
/// failure.
fn provider_error(err: TransportError) -> ProviderError {
    match err.as_error_resp() {
        Some(payload) => ProviderError::from_rpc(payload.code, payload.message.to_string()),
        None => ProviderError::Transport(err.to_string()),
    }
}

pub struct RpcProvider {
    http: DynProvider,
    /// Set when transactions are signed locally.
    signer: Option<Address>,
    ws_url: String,
    ws: ConnectionSlot<DynProvider>,
}

impl RpcProvider {
    pub fn new(
        rpc_url: &str,
        ws_url: impl Into<String>,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self, ProviderError> {
        let url = rpc_url
            .parse()
            .map_err(|e| ProviderError::Transport(format!("{rpc_url}: {e}")))?;
        let signer_address = signer.as_ref().map(PrivateKeySigner::address);
        let http = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };
        Ok(Self {
            http,
            signer: signer_address,
            ws_url: ws_url.into(),
            ws: ConnectionSlot::new(),
        })
    }
}

impl Provider for RpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        if let Some(signer) = self.signer {
            return Ok(vec![signer]);
        }
        let requested = self
            .http
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await
            .map_err(provider_error);
        match requested {
            Err(err) if err.is_method_not_found() => {
                tracing::debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.accounts().await
            }
            other => other,
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        match self.signer {
            Some(signer) => Ok(vec![signer]),
            None => self.http.get_accounts().await.map_err(provider_error),
        }
    }

    async fn send_transaction(&self, mut tx: TransactionRequest) -> Result<B256, ProviderError> {
        if let Some(signer) = self.signer {
            match tx.from {
                Some(requested) if requested != signer => {
                    return Err(ProviderError::UnknownAccount(requested));
                }
                _ => tx.from = Some(signer),
            }
        }
        let pending = self
            .http
            .send_transaction(tx)
            .await
            .map_err(provider_error)?;
        Ok(*pending.tx_hash())
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        self.http.call(tx).await.map_err(provider_error)
    }

    async fn subscribe_logs(&self, filter: Filter) -> Result<Subscription, ProviderError> {
        self.ws
            .run(
                || connect_ws(&self.ws_url),
                |ws| {
                    let filter = filter.clone();
                    async move {
                        let subscription = ws.subscribe_logs(&filter).await.map_err(provider_error)?;
                        Ok(Subscription {
                            id: *subscription.local_id(),
                            logs: subscription.into_stream().map(Ok).boxed(),
                        })
                    }
                },
            )
            .await
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ProviderError> {
        match self.ws.current().await {
            Some(ws) => ws.unsubscribe(id).await.map_err(provider_error),
            None => Ok(()),
        }
    }

    async fn balance(&self, account: Address) -> Result<U256, ProviderError> {
        self.http.get_balance(account).await.map_err(provider_error)
    }

    fn provider_name(&self) -> &str {
        if self.signer.is_some() {
            "local-key"
        } else {
            "json-rpc"
        }
    }
}
