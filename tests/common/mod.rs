//! Shared gateway doubles for the mint lifecycle tests.
//!
//! Write and confirmation calls park until the test resolves them, so every
//! interleaving (late results, disconnects mid-flight) can be driven by hand.
//! Balance reads resolve immediately with a configurable answer.

#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

use badge_mint::blockchain::{ChainError, ChainResult};
use badge_mint::mint::{
    BalanceView, Confirmation, ConfirmationWatcher, Gateways, ManagerSettings, MintHandle, MintInput,
    MintManager, MintState, ReadGateway, TxHandle, WriteGateway,
};
use badge_mint::session::SessionProvider;

pub const WAIT: Duration = Duration::from_secs(2);

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn tx(byte: u8) -> TxHandle {
    TxHandle::new(B256::repeat_byte(byte))
}

/// Calls that wait for the test to answer them.
pub struct Parked<Req, Resp> {
    queue: Mutex<VecDeque<(Req, oneshot::Sender<Resp>)>>,
    arrived: Notify,
    calls: AtomicU32,
}

impl<Req, Resp> Default for Parked<Req, Resp> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            arrived: Notify::new(),
            calls: AtomicU32::new(0),
        }
    }
}

impl<Req, Resp> Parked<Req, Resp> {
    async fn call(&self, request: Req) -> Option<Resp> {
        let (tx, rx) = oneshot::channel();
        self.queue.lock().unwrap().push_back((request, tx));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.arrived.notify_one();
        rx.await.ok()
    }

    /// Take the oldest parked call, waiting for one to arrive.
    pub async fn next(&self) -> (Req, oneshot::Sender<Resp>) {
        let taken = tokio::time::timeout(WAIT, async {
            loop {
                if let Some(call) = self.queue.lock().unwrap().pop_front() {
                    return call;
                }
                self.arrived.notified().await;
            }
        })
        .await;
        taken.expect("no gateway call arrived")
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MockWrite {
    pub parked: Parked<String, ChainResult<TxHandle>>,
}

#[async_trait]
impl WriteGateway for MockWrite {
    async fn submit(&self, input: &MintInput) -> ChainResult<TxHandle> {
        self.parked
            .call(input.text.clone())
            .await
            .unwrap_or_else(|| Err(ChainError::Rpc("mock write dropped".to_string())))
    }
}

#[derive(Default)]
pub struct MockWatcher {
    pub parked: Parked<TxHandle, ChainResult<Confirmation>>,
}

#[async_trait]
impl ConfirmationWatcher for MockWatcher {
    async fn watch(&self, handle: TxHandle) -> ChainResult<Confirmation> {
        self.parked
            .call(handle)
            .await
            .unwrap_or_else(|| Err(ChainError::Rpc("mock watcher dropped".to_string())))
    }
}

/// Answers every read with the current `answer`.
pub struct MockRead {
    answer: Mutex<Result<u64, String>>,
    accounts: Mutex<Vec<Address>>,
}

impl MockRead {
    pub fn new(balance: u64) -> Self {
        Self {
            answer: Mutex::new(Ok(balance)),
            accounts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_balance(&self, balance: u64) {
        *self.answer.lock().unwrap() = Ok(balance);
    }

    pub fn fail_with(&self, message: &str) {
        *self.answer.lock().unwrap() = Err(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Accounts read so far, oldest first.
    pub fn accounts(&self) -> Vec<Address> {
        self.accounts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadGateway for MockRead {
    async fn badge_balance(&self, account: Address) -> ChainResult<U256> {
        self.accounts.lock().unwrap().push(account);
        let answer = self.answer.lock().unwrap().clone();
        answer.map(U256::from).map_err(ChainError::Rpc)
    }
}

/// A mounted manager with its doubles.
pub struct Harness {
    pub handle: MintHandle,
    pub task: JoinHandle<()>,
    pub session: SessionProvider,
    pub read: Arc<MockRead>,
    pub write: Arc<MockWrite>,
    pub watcher: Arc<MockWatcher>,
}

impl Harness {
    pub fn mount(session: SessionProvider, balance: u64) -> Self {
        let read = Arc::new(MockRead::new(balance));
        let write = Arc::new(MockWrite::default());
        let watcher = Arc::new(MockWatcher::default());
        let gateways = Gateways::new(read.clone(), write.clone(), watcher.clone());

        let (handle, task) = MintManager::spawn(gateways, session.subscribe(), ManagerSettings::default());
        Self {
            handle,
            task,
            session,
            read,
            write,
            watcher,
        }
    }

    pub fn connected(balance: u64) -> Self {
        Self::mount(SessionProvider::connected(account(0xAA)), balance)
    }

    pub async fn wait_state<F>(&self, predicate: F) -> MintState
    where
        F: FnMut(&MintState) -> bool,
    {
        tokio::time::timeout(WAIT, self.handle.wait_for(predicate))
            .await
            .expect("state never matched")
            .expect("manager stopped")
    }

    pub async fn wait_balance<F>(&self, predicate: F) -> BalanceView
    where
        F: FnMut(&BalanceView) -> bool,
    {
        let mut rx = self.handle.watch_balance();
        let view = tokio::time::timeout(WAIT, rx.wait_for(predicate))
            .await
            .expect("balance never matched")
            .expect("manager stopped");
        view.clone()
    }

    /// Drive one attempt from submit to `Confirming`.
    pub async fn reach_confirming(&self, answer: &str, handle: TxHandle) {
        assert!(self.handle.submit(answer).await.is_accepted());
        let (_, reply) = self.write.parked.next().await;
        reply.send(Ok(handle)).unwrap();
        self.wait_state(|s| *s == MintState::Confirming(handle)).await;
    }
}
