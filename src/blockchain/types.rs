//! Chain-specific types and error definitions.

use thiserror::Error;

pub use crate::config::schema::NetworkConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to the chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not settled within the watcher's deadline.
    #[error("Transaction not confirmed within {0} seconds")]
    ConfirmationTimeout(u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Signer could not be loaded or used.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The wallet or node refused the request (e.g. user declined).
    #[error("{0}")]
    Rejected(String),

    /// Contract returned data that does not match the interface.
    #[error("Contract error: {0}")]
    Contract(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Progress of a transaction observed by polling its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// No receipt yet.
    Pending,
    /// Mined but not deep enough.
    Confirming { current: u32, required: u32 },
    /// Mined with the required depth.
    Confirmed { block_number: u64 },
    /// Mined and reverted.
    Failed(String),
}
