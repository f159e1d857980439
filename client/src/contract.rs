use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, TxKind, B256, U256};
use alloy::rpc::types::TransactionInput;
use ethbank_common::abi::{self, AbiError};
use ethbank_common::events::{BankEvent, EventKind};
use ethbank_common::provider::{Filter, Log, Provider, Subscription, TransactionRequest};

use crate::error::ClientError;

/// Typed proxy for the deployed bank contract.
///
/// Function calls are encoded against the interface loaded at connect time;
/// the provider handles signing and delivery.
#[derive(Debug)]
pub struct Contract<P> {
    provider: Arc<P>,
    abi: JsonAbi,
    address: Address,
}

impl<P> Clone for Contract<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            abi: self.abi.clone(),
            address: self.address,
        }
    }
}

impl<P: Provider> Contract<P> {
    pub fn new(provider: Arc<P>, abi: JsonAbi, address: Address) -> Self {
        Self {
            provider,
            abi,
            address,
        }
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Send `value` wei into the contract via the payable `deposit()`.
    pub async fn deposit(&self, from: Address, value: U256, gas: u64) -> Result<B256, ClientError> {
        let data = abi::encode_call(abi::function(&self.abi, "deposit")?, &[])?;
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(self.address)),
            value: Some(value),
            gas: Some(gas),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        tracing::info!("Submitting deposit of {value} wei from {from}");
        Ok(self.provider.send_transaction(tx).await?)
    }

    /// Move `amount` wei of contract-held balance to `to`. No value attached.
    pub async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<B256, ClientError> {
        let data = abi::encode_call(
            abi::function(&self.abi, "transfer")?,
            &[DynSolValue::Address(to), DynSolValue::Uint(amount, 256)],
        )?;
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(self.address)),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        tracing::info!("Submitting transfer of {amount} wei from {from} to {to}");
        Ok(self.provider.send_transaction(tx).await?)
    }

    /// Read-only `getBalance(who)`, in wei.
    pub async fn get_balance(&self, who: Address) -> Result<U256, ClientError> {
        let function = abi::function(&self.abi, "getBalance")?;
        let data = abi::encode_call(function, &[DynSolValue::Address(who)])?;
        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.address)),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        let output = self.provider.call(tx).await?;
        Ok(abi::decode_uint_output(function, &output)?)
    }

    /// Open a push-stream of `kind` logs emitted by this contract from the
    /// chain head onward.
    pub async fn subscribe(&self, kind: EventKind) -> Result<Subscription, ClientError> {
        let topic = abi::event(&self.abi, kind.name())?.selector();
        let filter = Filter::new().address(self.address).event_signature(topic);
        Ok(self.provider.subscribe_logs(filter).await?)
    }

    pub fn decode(&self, kind: EventKind, log: &Log) -> Result<BankEvent, AbiError> {
        let event = abi::event(&self.abi, kind.name())?;
        let values = abi::decode_log(event, log.topics(), &log.data().data)?;
        BankEvent::from_values(kind, &values)
    }
}
