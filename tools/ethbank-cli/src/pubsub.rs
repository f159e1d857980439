//! The WebSocket connection used for `eth_subscribe`.
//!
//! The connection is opened on first use and cached. When a request on it
//! fails because the socket is gone, the cached handle is dropped and a new
//! connection is opened for a single retry.

use std::future::Future;

use alloy::providers::{DynProvider, Provider as _, ProviderBuilder, WsConnect};
use tokio::sync::Mutex;

use ethbank_common::provider::ProviderError;

/// Open a pubsub-capable provider on `url`.
pub async fn connect_ws(url: &str) -> Result<DynProvider, ProviderError> {
    let provider = ProviderBuilder::new()
        .connect_ws(WsConnect::new(url))
        .await
        .map_err(|e| ProviderError::Transport(format!("{url}: {e}")))?;
    tracing::info!("Connected to {url}");
    Ok(provider.erased())
}

/// A lazily opened connection that is replaced once it stops working.
pub struct ConnectionSlot<T> {
    current: Mutex<Option<T>>,
}

impl<T> Default for ConnectionSlot<T> {
    fn default() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }
}

impl<T: Clone> ConnectionSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached connection, if one is open.
    pub async fn current(&self) -> Option<T> {
        self.current.lock().await.clone()
    }

    /// Forget the cached connection. The next use reconnects.
    pub async fn reset(&self) -> Option<T> {
        self.current.lock().await.take()
    }

    pub async fn get_or_connect<C, CFut>(&self, connect: C) -> Result<T, ProviderError>
    where
        C: FnOnce() -> CFut,
        CFut: Future<Output = Result<T, ProviderError>>,
    {
        let mut current = self.current.lock().await;
        if let Some(connection) = current.as_ref() {
            return Ok(connection.clone());
        }
        let connection = connect().await?;
        *current = Some(connection.clone());
        Ok(connection)
    }

    /// Run `op` on the connection. A transport failure drops the connection;
    /// `op` is then retried once on a fresh one.
    pub async fn run<C, CFut, O, OFut, R>(&self, connect: C, op: O) -> Result<R, ProviderError>
    where
        C: Fn() -> CFut,
        CFut: Future<Output = Result<T, ProviderError>>,
        O: Fn(T) -> OFut,
        OFut: Future<Output = Result<R, ProviderError>>,
    {
        let connection = self.get_or_connect(&connect).await?;
        match op(connection).await {
            Err(ProviderError::Transport(reason)) => {
                tracing::warn!("WebSocket connection unusable ({reason}), reconnecting");
                self.reset().await;
                let connection = self.get_or_connect(&connect).await?;
                op(connection).await
            }
            other => other,
        }
    }
}
