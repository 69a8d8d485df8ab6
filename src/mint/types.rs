//! Values exchanged between the mint core, its gateways and the presentation layer.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mint::errors::{FailureReason, MintError};

/// Wallet connection as reported by the session provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Whether a wallet is connected.
    pub connected: bool,
    /// Active account, if the wallet exposes one.
    pub address: Option<Address>,
}

impl Session {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Address) -> Self {
        Self {
            connected: true,
            address: Some(address),
        }
    }

    /// The account to act for, only while connected.
    pub fn account(&self) -> Option<Address> {
        if self.connected {
            self.address
        } else {
            None
        }
    }
}

/// Free-form answer typed by the user before minting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MintInput {
    pub text: String,
}

impl MintInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for MintInput {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MintInput {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Displayed badge count for the active account.
///
/// `value` stays `None` until the first read resolves and reverts to `None`
/// on disconnect. A failed refresh keeps the last value and sets `notice`.
/// `refreshing` is set while a read for the active account is outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BalanceView {
    pub value: Option<U256>,
    pub notice: Option<MintError>,
    pub refreshing: bool,
}

/// Opaque reference to a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(TxHash);

impl TxHandle {
    pub fn new(hash: TxHash) -> Self {
        Self(hash)
    }

    pub fn hash(&self) -> TxHash {
        self.0
    }

    /// Shortened form for display, e.g. `0x12345678...9abcdef0`.
    pub fn preview(&self, head: usize, tail: usize) -> String {
        let full = self.to_string();
        if head.saturating_add(tail) >= full.len() {
            return full;
        }
        format!("{}...{}", &full[..head], &full[full.len() - tail..])
    }
}

impl From<TxHash> for TxHandle {
    fn from(hash: TxHash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&alloy::hex::encode_prefixed(self.0))
    }
}

/// Identity of one submission attempt. Every awaited resolution carries the
/// attempt that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one balance read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReadTicket(pub u64);

/// Progress of the current mint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum MintState {
    #[default]
    Idle,
    Submitting,
    Confirming(TxHandle),
    Confirmed(TxHandle),
    Failed(FailureReason),
}

impl MintState {
    /// A transaction is in flight; new submissions are refused.
    pub fn is_busy(&self) -> bool {
        matches!(self, MintState::Submitting | MintState::Confirming(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MintState::Confirmed(_) | MintState::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MintState::Idle => "idle",
            MintState::Submitting => "submitting",
            MintState::Confirming(_) => "confirming",
            MintState::Confirmed(_) => "confirmed",
            MintState::Failed(_) => "failed",
        }
    }

    /// Submit button caption.
    pub fn label(&self) -> &'static str {
        match self {
            MintState::Submitting => "Confirming...",
            MintState::Confirming(_) => "Minting...",
            _ => "Mint Badge",
        }
    }

    /// Whether the answer field accepts edits.
    pub fn can_edit(&self) -> bool {
        !self.is_busy()
    }

    /// Whether the submit affordance is enabled for `input`.
    pub fn submit_enabled(&self, input: &MintInput) -> bool {
        !self.is_busy() && crate::mint::validation::validate(input).is_ok()
    }
}

impl fmt::Display for MintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintState::Confirming(h) | MintState::Confirmed(h) => write!(f, "{}({})", self.name(), h),
            MintState::Failed(reason) => write!(f, "failed({})", reason),
            _ => f.write_str(self.name()),
        }
    }
}

/// Result of a submit request as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The write gateway was invoked for this attempt.
    Accepted(AttemptId),
    /// A transaction is already in flight; nothing happened.
    NotReady,
    /// Refused before reaching any gateway.
    Rejected(MintError),
    /// The manager is no longer running.
    Unmounted,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}
