//! Badge minting client library.
//!
//! The [`mint`] subsystem sequences a wallet session, a balance read, a mint
//! submission and confirmation polling into one state machine; the
//! [`blockchain`] subsystem provides the JSON-RPC gateways it drives.

pub mod blockchain;
pub mod config;
pub mod mint;
pub mod observability;
pub mod session;

pub use config::AppConfig;
pub use mint::{MintHandle, MintManager, MintState};
pub use session::SessionProvider;
