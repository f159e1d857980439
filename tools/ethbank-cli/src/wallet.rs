//! Native-currency wallet commands: key generation, balances, plain value
//! transfers and message signatures.

use alloy::hex;
use alloy::primitives::{keccak256, Signature, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use anyhow::{bail, ensure, Context, Result};

use ethbank_common::provider::{Provider, TransactionRequest};
use ethbank_common::units::{format_eth, parse_ether};
use ethbank_common::{parse_address, Address, B256, U256};

/// Gas for a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// A freshly generated account.
pub struct NewAccount {
    pub address: Address,
    pub private_key_hex: String,
}

pub fn new_account() -> NewAccount {
    let signer = PrivateKeySigner::random();
    NewAccount {
        address: signer.address(),
        private_key_hex: hex::encode(signer.to_bytes()),
    }
}

fn address_arg(input: &str, what: &str) -> Result<Address> {
    parse_address(input).with_context(|| format!("invalid {what} `{input}`"))
}

pub async fn native_balance<P: Provider>(provider: &P, address: &str) -> Result<U256> {
    let address = address_arg(address, "address")?;
    Ok(provider.balance(address).await?)
}

pub fn render_balance(balance: U256) -> String {
    format!("Balance: {}", format_eth(balance))
}

/// Send `amount` ether from the provider's local key to `to`.
pub async fn send_value<P: Provider>(provider: &P, to: &str, amount: &str) -> Result<B256> {
    let to = address_arg(to, "recipient")?;
    let value = parse_ether(amount).context("invalid amount")?;
    if value.is_zero() {
        bail!("amount must be greater than zero");
    }

    let from = provider
        .accounts()
        .await?
        .first()
        .copied()
        .context("no sending account available")?;
    let tx = TransactionRequest {
        from: Some(from),
        to: Some(TxKind::Call(to)),
        value: Some(value),
        gas: Some(TRANSFER_GAS),
        ..Default::default()
    };
    tracing::info!("Sending {} from {from} to {to}", format_eth(value));
    Ok(provider.send_transaction(tx).await?)
}

/// Signature over keccak256(message), as 65-byte `r ‖ s ‖ v` hex with a
/// 0/1 recovery id.
pub fn sign_text(signer: &PrivateKeySigner, message: &str) -> Result<String> {
    let signature = signer.sign_hash_sync(&keccak256(message.as_bytes()))?;
    let mut raw = signature.as_bytes();
    raw[64] = u8::from(signature.v());
    Ok(hex::encode(raw))
}

pub fn verify_text(message: &str, signature: &str, address: &str) -> Result<bool> {
    let raw = hex::decode(signature.trim()).context("invalid signature")?;
    ensure!(raw.len() == 65, "signature must be 65 bytes, got {}", raw.len());
    let signature = Signature::from_raw(&raw).context("invalid signature")?;
    let expected = address_arg(address, "address")?;
    let recovered = signature.recover_address_from_prehash(&keccak256(message.as_bytes()))?;
    Ok(recovered == expected)
}
