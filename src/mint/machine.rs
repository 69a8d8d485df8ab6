//! Mint lifecycle state machine.
//!
//! # States
//! - Idle: nothing submitted since mount or since the last disconnect
//! - Submitting: write gateway invoked, waiting for a transaction handle
//! - Confirming(handle): waiting for the watcher to settle `handle`
//! - Confirmed(handle) / Failed(reason): terminal until the next submit
//!
//! # State Transitions
//! ```text
//! Idle | Confirmed | Failed  --submit (valid, connected)--> Submitting
//! Submitting  --write ok(h)-->        Confirming(h)
//! Submitting  --write err-->          Failed
//! Confirming(h) --confirmed(h)-->     Confirmed(h)   (+ balance refresh)
//! Confirming(h) --failed(h)-->        Failed
//! any         --disconnect-->         Idle
//! ```
//!
//! The machine performs no I/O. Every operation returns the [`Effect`] the
//! driver must run, and every resolution is matched against the attempt or
//! ticket that produced it; anything else is discarded.

use alloy::primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::blockchain::types::{ChainError, ChainResult};
use crate::mint::errors::{FailureReason, MintError};
use crate::mint::gateway::Confirmation;
use crate::mint::types::{
    AttemptId, BalanceView, MintInput, MintState, ReadTicket, Session, SubmitOutcome, TxHandle,
};
use crate::mint::validation::validate;
use crate::observability::metrics;

/// Gateway work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit { attempt: AttemptId, input: MintInput },
    Watch { attempt: AttemptId, handle: TxHandle },
    ReadBalance { ticket: ReadTicket, account: Address },
}

#[derive(Debug)]
pub struct MintMachine {
    state: MintState,
    session: Session,
    /// Attempt owning the current Submitting/Confirming state.
    in_flight: Option<AttemptId>,
    last_attempt: u64,
    balance: BalanceView,
    /// Latest issued read; older results are stale.
    pending_read: Option<(ReadTicket, Address)>,
    last_ticket: u64,
    reason_max_len: usize,
}

impl MintMachine {
    pub fn new(session: Session, reason_max_len: usize) -> Self {
        Self {
            state: MintState::Idle,
            session,
            in_flight: None,
            last_attempt: 0,
            balance: BalanceView::default(),
            pending_read: None,
            last_ticket: 0,
            reason_max_len,
        }
    }

    pub fn state(&self) -> &MintState {
        &self.state
    }

    pub fn balance(&self) -> &BalanceView {
        &self.balance
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Initial balance read for the mounted session.
    pub fn mount(&mut self) -> Option<Effect> {
        self.refresh_balance()
    }

    /// Start a new attempt if the guards allow it.
    pub fn submit(&mut self, input: MintInput) -> (SubmitOutcome, Option<Effect>) {
        if self.state.is_busy() {
            debug!(state = %self.state, "Submit ignored while a transaction is in flight");
            metrics::record_submit("not_ready");
            return (SubmitOutcome::NotReady, None);
        }
        if let Err(e) = validate(&input) {
            metrics::record_submit("invalid");
            return (SubmitOutcome::Rejected(e.into()), None);
        }
        if self.session.account().is_none() {
            metrics::record_submit("disconnected");
            return (SubmitOutcome::Rejected(MintError::Session), None);
        }

        self.last_attempt += 1;
        let attempt = AttemptId(self.last_attempt);
        self.in_flight = Some(attempt);
        self.transition(MintState::Submitting, attempt);
        metrics::record_submit("accepted");

        (SubmitOutcome::Accepted(attempt), Some(Effect::Submit { attempt, input }))
    }

    /// Write gateway settled for `attempt`.
    pub fn write_resolved(
        &mut self,
        attempt: AttemptId,
        result: ChainResult<TxHandle>,
    ) -> Option<Effect> {
        if self.in_flight != Some(attempt) || self.state != MintState::Submitting {
            debug!(%attempt, state = %self.state, "Discarding stale write resolution");
            metrics::record_stale("write");
            return None;
        }

        match result {
            Ok(handle) => {
                self.transition(MintState::Confirming(handle), attempt);
                Some(Effect::Watch { attempt, handle })
            }
            Err(e) => {
                warn!(%attempt, error = %e, "Mint submission failed");
                self.in_flight = None;
                let reason = FailureReason::submission(submission_message(&e), self.reason_max_len);
                self.transition(MintState::Failed(reason), attempt);
                None
            }
        }
    }

    /// Confirmation watcher settled `handle` for `attempt`.
    pub fn confirmation_resolved(
        &mut self,
        attempt: AttemptId,
        handle: TxHandle,
        result: ChainResult<Confirmation>,
    ) -> Option<Effect> {
        let tracked = matches!(&self.state, MintState::Confirming(h) if *h == handle);
        if !tracked || self.in_flight != Some(attempt) {
            debug!(%attempt, tx = %handle, state = %self.state, "Discarding stale confirmation");
            metrics::record_stale("confirmation");
            return None;
        }

        self.in_flight = None;
        match result {
            Ok(Confirmation::Confirmed { block_number }) => {
                info!(%attempt, tx = %handle, block_number, "Badge minted");
                self.transition(MintState::Confirmed(handle), attempt);
                self.refresh_balance()
            }
            Ok(Confirmation::Failed(detail)) => {
                warn!(%attempt, tx = %handle, detail = %detail, "Mint transaction failed");
                let reason = FailureReason::confirmation(detail, self.reason_max_len);
                self.transition(MintState::Failed(reason), attempt);
                None
            }
            Err(e) => {
                warn!(%attempt, tx = %handle, error = %e, "Confirmation watcher failed");
                let reason = FailureReason::confirmation(e, self.reason_max_len);
                self.transition(MintState::Failed(reason), attempt);
                None
            }
        }
    }

    /// Session provider pushed a new session.
    pub fn session_changed(&mut self, session: Session) -> Option<Effect> {
        let previous = self.session.account();
        self.session = session;

        let Some(account) = session.account() else {
            let attempt = self.in_flight.take().unwrap_or(AttemptId(self.last_attempt));
            if self.state != MintState::Idle {
                info!(state = %self.state, "Wallet disconnected, dropping in-flight tracking");
                self.transition(MintState::Idle, attempt);
            }
            self.pending_read = None;
            self.balance = BalanceView::default();
            return None;
        };

        if previous == Some(account) {
            return None;
        }
        info!(%account, "Active account changed");
        self.balance = BalanceView::default();
        self.refresh_balance()
    }

    /// Issue a new balance read for the active account, superseding any
    /// read still outstanding.
    pub fn refresh_balance(&mut self) -> Option<Effect> {
        let account = self.session.account()?;
        self.last_ticket += 1;
        let ticket = ReadTicket(self.last_ticket);
        self.pending_read = Some((ticket, account));
        self.balance.refreshing = true;
        Some(Effect::ReadBalance { ticket, account })
    }

    /// Read gateway settled for `ticket`.
    pub fn balance_resolved(&mut self, ticket: ReadTicket, result: ChainResult<U256>) {
        let current = matches!(
            self.pending_read,
            Some((t, account)) if t == ticket && self.session.account() == Some(account)
        );
        if !current {
            debug!(ticket = ticket.0, "Discarding stale balance read");
            metrics::record_stale("balance");
            return;
        }

        self.pending_read = None;
        match result {
            Ok(value) => {
                metrics::record_balance_refresh("ok");
                self.balance = BalanceView {
                    value: Some(value),
                    notice: None,
                    refreshing: false,
                };
            }
            Err(e) => {
                warn!(error = %e, "Balance refresh failed, keeping last value");
                metrics::record_balance_refresh("error");
                self.balance.notice = Some(MintError::Read(e.to_string()));
                self.balance.refreshing = false;
            }
        }
    }

    fn transition(&mut self, to: MintState, attempt: AttemptId) {
        info!(from = self.state.name(), to = to.name(), %attempt, "Mint state transition");
        metrics::record_transition(to.name());
        self.state = to;
    }
}

/// Rejections from the wallet are shown as-is; other failures keep their
/// error prefix.
fn submission_message(error: &ChainError) -> String {
    match error {
        ChainError::Rejected(message) => message.clone(),
        other => other.to_string(),
    }
}
