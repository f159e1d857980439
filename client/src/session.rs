use std::sync::Arc;

use ethbank_common::abi;
use ethbank_common::events::EventKind;
use ethbank_common::provider::Provider;
use ethbank_common::Address;

use crate::config::SessionConfig;
use crate::contract::Contract;
use crate::error::ClientError;
use crate::interface::{load_interface, InterfaceError, InterfaceSource};
use crate::relay::{Delivery, EventRelay};
use crate::surface::Surface;

/// Accounts the wallet authorized for this session. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    accounts: Vec<Address>,
}

impl Connection {
    pub fn new(accounts: Vec<Address>) -> Option<Self> {
        (!accounts.is_empty()).then_some(Self { accounts })
    }

    /// The account transactions are sent from.
    pub fn primary(&self) -> Address {
        self.accounts[0]
    }
}

/// Client session: the wallet connection, the contract handle bound to the
/// loaded interface, and the event relay.
///
/// `connect` and `disconnect` are the only operations that replace the
/// connection or the contract handle.
pub struct Session<P, I> {
    pub(crate) provider: Arc<P>,
    interface: I,
    pub(crate) config: SessionConfig,
    pub(crate) connection: Option<Connection>,
    pub(crate) contract: Option<Contract<P>>,
    relay: EventRelay,
}

impl<P: Provider, I: InterfaceSource> Session<P, I> {
    pub fn new(provider: Arc<P>, interface: I, config: SessionConfig) -> Self {
        Self {
            provider,
            interface,
            config,
            connection: None,
            contract: None,
            relay: EventRelay::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.contract.is_some()
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn relay(&self) -> &EventRelay {
        &self.relay
    }

    /// Authorize with the wallet, load the interface, bind the contract and
    /// start the event relay.
    ///
    /// Existing state is torn down first. On failure the user gets a notice
    /// and the session is left disconnected.
    pub async fn connect<S: Surface>(&mut self, surface: &mut S) -> Result<(), ClientError> {
        self.disconnect().await;

        match self.establish(surface).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::error!("Connect failed: {err}");
                self.connection = None;
                surface.notify(&format!("Access denied or an error occurred: {err}"));
                Err(err)
            }
        }
    }

    async fn establish<S: Surface>(&mut self, surface: &mut S) -> Result<(), ClientError> {
        let accounts = self
            .provider
            .request_accounts()
            .await
            .map_err(|err| ClientError::AuthorizationDenied(err.to_string()))?;
        let connection = Connection::new(accounts)
            .ok_or_else(|| ClientError::AuthorizationDenied("no accounts authorized".into()))?;
        let primary = connection.primary();
        tracing::info!("Connected to {} as {primary}", self.provider.provider_name());
        surface.set_status(&format!("Connected: {primary}"));
        self.connection = Some(connection);

        let abi = load_interface(&self.interface).await?;
        let contract = Contract::new(Arc::clone(&self.provider), abi, self.config.contract_address);
        // Both relayed events must be described.
        for kind in EventKind::ALL {
            abi::event(contract.abi(), kind.name()).map_err(InterfaceError::from)?;
        }

        if self.config.subscribe_on_connect {
            self.relay.subscribe(&contract, surface).await;
        }
        self.contract = Some(contract);
        Ok(())
    }

    /// Drop the contract handle and cancel the relay's subscriptions.
    pub async fn disconnect(&mut self) {
        self.relay.unsubscribe(self.provider.as_ref()).await;
        if self.contract.take().is_some() {
            tracing::info!("Disconnected");
        }
        self.connection = None;
    }

    /// Start a fresh subscription epoch on the current contract.
    pub async fn resubscribe<S: Surface>(&mut self, surface: &mut S) -> Result<(), ClientError> {
        let contract = self.contract.as_ref().ok_or(ClientError::NotConnected)?;
        self.relay.subscribe(contract, surface).await;
        Ok(())
    }

    /// Wait for the next event delivery and render it. `None` when not
    /// connected or when every stream has ended.
    pub async fn next_event<S: Surface>(&mut self, surface: &mut S) -> Option<Delivery> {
        let contract = self.contract.as_ref()?;
        let (kind, item) = self.relay.next_item().await?;
        Some(self.relay.deliver(contract, kind, item, surface))
    }
}
