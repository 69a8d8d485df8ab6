//! Mint lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! submit(input)
//!     → validation.rs (blank answers never leave the core)
//!     → machine.rs (guards, Idle → Submitting)
//!     → manager.rs spawns WriteGateway::submit
//!     → handle → ConfirmationWatcher::watch
//!     → Confirmed → ReadGateway::badge_balance
//!
//! SessionProvider ──notifications──▶ manager.rs ──▶ machine.rs (any → Idle)
//! manager.rs ──watch channels──▶ presentation (state, balance)
//! ```
//!
//! # Design Decisions
//! - One in-flight submission at a time; extra submits are no-ops
//! - No automatic retry after `Failed`; a new submit is required
//! - Balance reads never touch the lifecycle state
//! - Resolutions are keyed by attempt / handle / ticket and dropped when
//!   they no longer match what is tracked

pub mod errors;
pub mod gateway;
pub mod machine;
pub mod manager;
pub mod types;
pub mod validation;

pub use errors::{FailureKind, FailureReason, MintError, ValidationError};
pub use gateway::{Confirmation, ConfirmationWatcher, Gateways, ReadGateway, WriteGateway};
pub use machine::{Effect, MintMachine};
pub use manager::{ManagerSettings, MintHandle, MintManager};
pub use types::{AttemptId, BalanceView, MintInput, MintState, Session, SubmitOutcome, TxHandle};
pub use validation::validate;
