//! In-process wallet double for driving `Session` without a node.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc;
use futures::StreamExt;

use alloy::primitives::LogData;
use ethbank_client::{Delivery, MemorySurface, Session, SessionConfig, StaticInterface};
use ethbank_common::abi;
use ethbank_common::provider::{
    Filter, Log, Provider, ProviderError, Subscription, SubscriptionId, TransactionRequest,
};
use ethbank_common::{Address, Bytes, B256, U256};

pub const BANK_ABI: &str = include_str!("../../../static/abi.json");

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn ether(whole: u64, tenths: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18))
        + U256::from(tenths) * U256::from(10u64).pow(U256::from(17))
}

pub fn word(value: U256) -> Vec<u8> {
    value.to_be_bytes::<32>().to_vec()
}

fn topic(event: &str) -> B256 {
    let abi = abi::parse_interface(BANK_ABI).unwrap();
    abi::event(&abi, event).unwrap().selector()
}

pub fn deposit_topic() -> B256 {
    topic("Deposit")
}

pub fn transfer_topic() -> B256 {
    topic("Transfer")
}

/// A contract log with the given topics and data, positioned at
/// (`tx`, `log_index`) in block 100.
pub fn contract_log(topics: Vec<B256>, data: Vec<u8>, tx: u8, log_index: u64) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: ethbank_client::config::DEFAULT_CONTRACT_ADDRESS,
            data: LogData::new_unchecked(topics, data.into()),
        },
        block_number: Some(100),
        transaction_hash: Some(B256::repeat_byte(tx)),
        log_index: Some(log_index),
        ..Default::default()
    }
}

pub fn deposit_log(sender: Address, amount: U256, tx: u8, log_index: u64) -> Log {
    contract_log(
        vec![deposit_topic(), sender.into_word()],
        word(amount),
        tx,
        log_index,
    )
}

pub fn transfer_log(from: Address, to: Address, amount: U256, tx: u8, log_index: u64) -> Log {
    contract_log(
        vec![transfer_topic(), from.into_word(), to.into_word()],
        word(amount),
        tx,
        log_index,
    )
}

type LogSender = mpsc::UnboundedSender<Result<Log, ProviderError>>;

#[derive(Default)]
pub struct MockState {
    /// Every provider method invoked, in order.
    pub calls: Vec<&'static str>,
    pub accounts: Vec<Address>,
    pub reject_accounts: bool,
    pub sent: Vec<TransactionRequest>,
    pub send_error: Option<ProviderError>,
    pub calls_made: Vec<TransactionRequest>,
    pub call_result: Bytes,
    pub fail_subscribe: bool,
    pub next_subscription: u64,
    pub live: BTreeMap<SubscriptionId, (Filter, LogSender)>,
    pub unsubscribed: Vec<SubscriptionId>,
}

/// Scripted provider. Subscriptions are backed by unbounded channels so
/// tests can push deliveries to whichever filter matches topic0.
#[derive(Default)]
pub struct MockProvider {
    pub state: Mutex<MockState>,
}

impl MockProvider {
    pub fn with_accounts(accounts: Vec<Address>) -> Arc<Self> {
        let provider = Self::default();
        provider.state.lock().unwrap().accounts = accounts;
        Arc::new(provider)
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn live_ids(&self) -> Vec<SubscriptionId> {
        self.state.lock().unwrap().live.keys().cloned().collect()
    }

    /// Send `item` to every live subscription filtering on `topic0`.
    pub fn push(&self, topic0: B256, item: Result<Log, ProviderError>) {
        let state = self.state.lock().unwrap();
        for (filter, sender) in state.live.values() {
            if filter.topics[0].matches(&topic0) {
                sender.unbounded_send(item.clone()).unwrap();
            }
        }
    }

    pub fn push_log(&self, log: Log) {
        let topic0 = log.topics()[0];
        self.push(topic0, Ok(log));
    }

    fn record(&self, method: &'static str) {
        self.state.lock().unwrap().calls.push(method);
    }
}

impl Provider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.record("eth_requestAccounts");
        let state = self.state.lock().unwrap();
        if state.reject_accounts {
            return Err(ProviderError::Rejected);
        }
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.record("eth_accounts");
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, ProviderError> {
        self.record("eth_sendTransaction");
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.send_error.clone() {
            return Err(err);
        }
        state.sent.push(tx);
        Ok(B256::repeat_byte(state.sent.len() as u8))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        self.record("eth_call");
        let mut state = self.state.lock().unwrap();
        state.calls_made.push(tx);
        Ok(state.call_result.clone())
    }

    async fn subscribe_logs(&self, filter: Filter) -> Result<Subscription, ProviderError> {
        self.record("eth_subscribe");
        let mut state = self.state.lock().unwrap();
        if state.fail_subscribe {
            return Err(ProviderError::Transport("websocket unavailable".into()));
        }
        state.next_subscription += 1;
        let id = B256::with_last_byte(state.next_subscription as u8);
        let (tx, rx) = mpsc::unbounded();
        state.live.insert(id, (filter, tx));
        Ok(Subscription {
            id,
            logs: rx.boxed(),
        })
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ProviderError> {
        self.record("eth_unsubscribe");
        let mut state = self.state.lock().unwrap();
        state.unsubscribed.push(id);
        state.live.remove(&id);
        Ok(())
    }

    async fn balance(&self, _account: Address) -> Result<U256, ProviderError> {
        self.record("eth_getBalance");
        Ok(U256::ZERO)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

pub type TestSession = Session<MockProvider, StaticInterface>;

pub fn new_session(provider: &Arc<MockProvider>) -> TestSession {
    Session::new(
        Arc::clone(provider),
        StaticInterface::new(BANK_ABI),
        SessionConfig::default(),
    )
}

/// A session already connected as `account(0xaa)`.
pub async fn connected() -> (Arc<MockProvider>, TestSession, MemorySurface) {
    tracing_subscriber::fmt::try_init().ok();
    let provider = MockProvider::with_accounts(vec![account(0xaa)]);
    let mut session = new_session(&provider);
    let mut surface = MemorySurface::new();
    session.connect(&mut surface).await.unwrap();
    (provider, session, surface)
}

/// Pull one delivery, failing the test if nothing arrives in time.
pub async fn next_delivery(session: &mut TestSession, surface: &mut MemorySurface) -> Delivery {
    tokio::time::timeout(TIMEOUT, session.next_event(surface))
        .await
        .expect("timed out waiting for a delivery")
        .expect("no live subscription streams")
}
