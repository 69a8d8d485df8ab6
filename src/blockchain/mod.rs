//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkConfig → client.rs (failover RPC reads with timeouts)
//!     → gateway.rs ContractReader  (balanceOf)      → mint::ReadGateway
//!     → watcher.rs ReceiptWatcher  (receipt depth)  → mint::ConfirmationWatcher
//!
//! BADGE_MINT_PRIVATE_KEY → wallet.rs (local signer)
//!     → gateway.rs ContractWriter  (mintDailyBadge) → mint::WriteGateway
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contract;
pub mod gateway;
pub mod types;
pub mod wallet;
pub mod watcher;

pub use client::ChainClient;
pub use gateway::{ContractReader, ContractWriter};
pub use types::{ChainError, ChainId, ChainResult};
pub use wallet::Wallet;
pub use watcher::ReceiptWatcher;
