//! `ethbank`: command-line front end for the bank contract, plus a small
//! native-currency wallet.
//!
//! Contract commands run a client session against a JSON-RPC node:
//!
//! - `deposit`, `transfer`, `contract-balance` connect, act once and exit
//! - `watch` connects and streams the contract's event log until Ctrl-C
//!
//! Without `--key` the node manages accounts and signs; with it, transactions
//! are signed locally and submitted raw.

mod interface;
mod provider;
mod pubsub;
mod terminal;
mod wallet;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use alloy::signers::local::PrivateKeySigner;
use ethbank_client::config::{DEFAULT_CONTRACT_ADDRESS, DEFAULT_INTERFACE_PATH};
use ethbank_client::{Delivery, Session, SessionConfig, Surface};
use ethbank_common::Address;

use crate::interface::InterfaceLocation;
use crate::provider::{derive_ws_url, RpcProvider};
use crate::terminal::TerminalSurface;

const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

#[derive(Parser)]
#[command(name = "ethbank", about = "Bank contract client and wallet tool")]
struct Cli {
    /// HTTP JSON-RPC endpoint of the node.
    #[arg(long, env = "ETHBANK_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// WebSocket endpoint for event subscriptions (default: --rpc-url with a
    /// ws scheme).
    #[arg(long, env = "ETHBANK_WS_URL")]
    ws_url: Option<String>,

    /// Address of the deployed bank contract.
    #[arg(long, env = "ETHBANK_CONTRACT", default_value_t = DEFAULT_CONTRACT_ADDRESS)]
    contract: Address,

    /// Contract interface description: a file path or an http(s) URL.
    #[arg(long, env = "ETHBANK_ABI", default_value = DEFAULT_INTERFACE_PATH)]
    abi: String,

    /// Hex private key. Enables local signing; required for send and sign.
    #[arg(long, env = "ETHBANK_KEY", hide_env_values = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deposit ether into the contract.
    Deposit { amount: String },
    /// Transfer contract-held ether to another address.
    Transfer { to: String, amount: String },
    /// Show an address's balance held by the contract.
    ContractBalance { address: String },
    /// Stream contract events until interrupted.
    Watch,
    /// Generate a new account.
    Account,
    /// Show an address's native balance.
    Balance { address: String },
    /// Send ether directly (21 000 gas, signed with --key).
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Sign keccak256(message) with --key.
    Sign { message: String },
    /// Check a signature produced by `sign`.
    Verify {
        message: String,
        #[arg(long)]
        sig: String,
        #[arg(long)]
        address: String,
    },
}

/// What a contract session does once connected.
enum SessionAction<'a> {
    Deposit { amount: &'a str },
    Transfer { to: &'a str, amount: &'a str },
    ContractBalance { address: &'a str },
    Watch,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let key = cli
        .key
        .as_deref()
        .map(str::parse::<PrivateKeySigner>)
        .transpose()
        .context("invalid --key")?;

    match &cli.command {
        Command::Deposit { amount } => {
            run_session(&cli, key, SessionAction::Deposit { amount }).await?;
        }
        Command::Transfer { to, amount } => {
            run_session(&cli, key, SessionAction::Transfer { to, amount }).await?;
        }
        Command::ContractBalance { address } => {
            run_session(&cli, key, SessionAction::ContractBalance { address }).await?;
        }
        Command::Watch => run_session(&cli, key, SessionAction::Watch).await?,
        Command::Account => {
            let account = wallet::new_account();
            println!("Address: {}", account.address);
            println!("Private key: {}", account.private_key_hex);
        }
        Command::Balance { address } => {
            let provider = build_provider(&cli, None)?;
            let balance = wallet::native_balance(&provider, address).await?;
            println!("{}", wallet::render_balance(balance));
        }
        Command::Send { to, amount } => {
            let key = key.context("--key is required for send")?;
            let provider = build_provider(&cli, Some(key))?;
            let hash = wallet::send_value(&provider, to, amount).await?;
            println!("Transaction sent. Hash: {hash}");
        }
        Command::Sign { message } => {
            let key = key.context("--key is required for sign")?;
            println!("Signature: {}", wallet::sign_text(&key, message)?);
        }
        Command::Verify { message, sig, address } => {
            if wallet::verify_text(message, sig, address)? {
                println!("Signature valid");
            } else {
                println!("Signature invalid");
            }
        }
    }
    Ok(())
}

fn build_provider(cli: &Cli, key: Option<PrivateKeySigner>) -> Result<RpcProvider> {
    let ws_url = cli
        .ws_url
        .clone()
        .unwrap_or_else(|| derive_ws_url(&cli.rpc_url));
    RpcProvider::new(&cli.rpc_url, ws_url, key).context("invalid --rpc-url")
}

async fn run_session(
    cli: &Cli,
    key: Option<PrivateKeySigner>,
    action: SessionAction<'_>,
) -> Result<()> {
    let provider = Arc::new(build_provider(cli, key)?);
    let config = SessionConfig {
        contract_address: cli.contract,
        subscribe_on_connect: matches!(action, SessionAction::Watch),
        ..SessionConfig::default()
    };
    let mut session = Session::new(provider, InterfaceLocation::new(cli.abi.clone()), config);
    let mut surface = TerminalSurface::stdout();

    session.connect(&mut surface).await?;

    match action {
        SessionAction::Deposit { amount } => {
            let hash = session.deposit(amount, &mut surface).await?;
            println!("Transaction: {hash}");
        }
        SessionAction::Transfer { to, amount } => {
            let hash = session.transfer(to, amount, &mut surface).await?;
            println!("Transaction: {hash}");
        }
        SessionAction::ContractBalance { address } => {
            session.get_balance(address, &mut surface).await?;
        }
        SessionAction::Watch => watch(&mut session, &mut surface).await?,
    }

    session.disconnect().await;
    Ok(())
}

async fn watch(
    session: &mut Session<RpcProvider, InterfaceLocation>,
    surface: &mut TerminalSurface,
) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                return Ok(());
            }
            delivery = session.next_event(surface) => match delivery {
                Some(Delivery::StreamFailed(kind)) => {
                    surface.notify(&format!("{kind} events stopped; run watch again to resubscribe"));
                }
                Some(_) => {}
                None => bail!("no live event streams; run watch again to reconnect"),
            },
        }
    }
}
