//! Collaborator contracts the mint core depends on.
//!
//! Each gateway call is one suspension point of the manager. Implementations
//! live in `crate::blockchain`; tests substitute in-memory doubles.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::ChainResult;
use crate::mint::types::{MintInput, TxHandle};

/// Read-only contract access.
#[async_trait]
pub trait ReadGateway: Send + Sync {
    /// Current badge count held by `account`.
    async fn badge_balance(&self, account: Address) -> ChainResult<U256>;
}

/// State-changing contract access.
#[async_trait]
pub trait WriteGateway: Send + Sync {
    /// Submit the mint call for `input` and return as soon as the transaction
    /// is accepted by the node.
    async fn submit(&self, input: &MintInput) -> ChainResult<TxHandle>;
}

/// Terminal status of a watched transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed { block_number: u64 },
    Failed(String),
}

/// Follows a submitted transaction to a terminal status. Polling and timeout
/// policy belong to the implementation.
#[async_trait]
pub trait ConfirmationWatcher: Send + Sync {
    async fn watch(&self, handle: TxHandle) -> ChainResult<Confirmation>;
}

/// The three gateways a manager drives.
#[derive(Clone)]
pub struct Gateways {
    pub read: Arc<dyn ReadGateway>,
    pub write: Arc<dyn WriteGateway>,
    pub watcher: Arc<dyn ConfirmationWatcher>,
}

impl Gateways {
    pub fn new(
        read: Arc<dyn ReadGateway>,
        write: Arc<dyn WriteGateway>,
        watcher: Arc<dyn ConfirmationWatcher>,
    ) -> Self {
        Self { read, write, watcher }
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}
