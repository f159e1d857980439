//! User-triggered contract operations.
//!
//! Every handler validates its input before touching the network and reports
//! the outcome to the surface: blocking notices for deposit and transfer,
//! inline balance renders for the balance query.

use ethbank_common::provider::Provider;
use ethbank_common::units::{format_eth, parse_ether};
use ethbank_common::{Address, B256, U256};

use crate::contract::Contract;
use crate::error::{ClientError, ValidationError};
use crate::interface::InterfaceSource;
use crate::session::Session;
use crate::surface::{InputField, Surface};

pub const NOT_CONNECTED_NOTICE: &str = "Contract not initialized. Please connect a wallet first!";
pub const INVALID_AMOUNT_NOTICE: &str = "Please enter a valid amount!";
pub const INVALID_ADDRESS_NOTICE: &str = "Please enter a valid address!";

fn parse_amount(input: &str) -> Result<U256, ValidationError> {
    Ok(parse_ether(input)?)
}

fn parse_address(input: &str) -> Result<Address, ValidationError> {
    Ok(ethbank_common::parse_address(input)?)
}

impl<P: Provider, I: InterfaceSource> Session<P, I> {
    fn require_contract<S: Surface>(&self, surface: &mut S) -> Result<Contract<P>, ClientError> {
        match &self.contract {
            Some(contract) => Ok(contract.clone()),
            None => {
                surface.notify(NOT_CONNECTED_NOTICE);
                Err(ClientError::NotConnected)
            }
        }
    }

    /// Account to send from: the wallet's first account, falling back to the
    /// first account authorized at connect time.
    async fn sender(&self) -> Result<Address, ClientError> {
        let accounts = self.provider.accounts().await?;
        match accounts.first() {
            Some(account) => Ok(*account),
            None => self
                .connection
                .as_ref()
                .map(|c| c.primary())
                .ok_or(ClientError::NotConnected),
        }
    }

    /// Deposit `amount` ether into the contract from the sending account.
    pub async fn deposit<S: Surface>(&mut self, amount: &str, surface: &mut S) -> Result<B256, ClientError> {
        let contract = self.require_contract(surface)?;
        let value = parse_amount(amount).map_err(|err| {
            surface.notify(INVALID_AMOUNT_NOTICE);
            ClientError::from(err)
        })?;

        let gas = self.config.deposit_gas_limit;
        let result = match self.sender().await {
            Ok(from) => contract.deposit(from, value, gas).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(tx_hash) => {
                tracing::info!("Deposit of {} sent in {tx_hash}", format_eth(value));
                surface.notify("Deposit successful!");
                surface.clear_input(InputField::DepositAmount);
                Ok(tx_hash)
            }
            Err(err) => {
                tracing::error!("Deposit error: {err}");
                surface.notify(&format!("Deposit failed! {err}"));
                Err(err)
            }
        }
    }

    /// Move `amount` ether of contract balance to `to`.
    pub async fn transfer<S: Surface>(
        &mut self,
        to: &str,
        amount: &str,
        surface: &mut S,
    ) -> Result<B256, ClientError> {
        let contract = self.require_contract(surface)?;
        let to = parse_address(to).map_err(|err| {
            surface.notify(INVALID_ADDRESS_NOTICE);
            ClientError::from(err)
        })?;
        let value = parse_amount(amount).map_err(|err| {
            surface.notify(INVALID_AMOUNT_NOTICE);
            ClientError::from(err)
        })?;

        let result = match self.sender().await {
            Ok(from) => contract.transfer(from, to, value).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(tx_hash) => {
                tracing::info!("Transfer to {to} sent in {tx_hash}");
                surface.notify("Transfer successful!");
                surface.clear_input(InputField::TransferTo);
                surface.clear_input(InputField::TransferAmount);
                Ok(tx_hash)
            }
            Err(err) => {
                tracing::error!("Transfer error: {err}");
                surface.notify(&format!("Transfer failed! {err}"));
                Err(err)
            }
        }
    }

    /// Query the contract-held balance of `address` and render it inline.
    pub async fn get_balance<S: Surface>(&mut self, address: &str, surface: &mut S) -> Result<U256, ClientError> {
        let Some(contract) = self.contract.clone() else {
            surface.show_balance("Error: connect a wallet first!");
            return Err(ClientError::NotConnected);
        };
        let who = match parse_address(address) {
            Ok(who) => who,
            Err(err) => {
                surface.show_balance("Error: enter a valid Ethereum address");
                return Err(err.into());
            }
        };

        match contract.get_balance(who).await {
            Ok(balance) => {
                surface.show_balance(&format!("Balance: {}", format_eth(balance)));
                Ok(balance)
            }
            Err(err) => {
                tracing::error!("Error getting balance: {err}");
                surface.show_balance(&format!("Error: {err}"));
                Err(err)
            }
        }
    }
}
