//! Async driver for [`MintMachine`].
//!
//! A single task owns the machine and is its only writer. It multiplexes
//! three inputs:
//! - session notifications (processed first, so a disconnect is applied
//!   before anything queued behind it)
//! - caller commands (`submit`, `refresh_balance`, `unmount`)
//! - gateway resolutions, each tagged with the attempt or ticket that
//!   produced it
//!
//! Gateway calls run in their own tasks and report back over a channel, so
//! the loop never blocks on I/O. After unmount those tasks still finish but
//! their results have nowhere to go.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use alloy::primitives::U256;

use crate::blockchain::types::ChainResult;
use crate::mint::gateway::{Confirmation, Gateways};
use crate::mint::machine::{Effect, MintMachine};
use crate::mint::types::{
    AttemptId, BalanceView, MintInput, MintState, ReadTicket, Session, SubmitOutcome, TxHandle,
};
use crate::session::SessionSubscription;

/// Tunables of the manager.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Maximum characters kept from a failure message.
    pub reason_max_len: usize,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self { reason_max_len: 100 }
    }
}

enum Command {
    Submit {
        input: MintInput,
        reply: oneshot::Sender<SubmitOutcome>,
    },
    RefreshBalance,
    Unmount,
}

enum Resolution {
    Write {
        attempt: AttemptId,
        result: ChainResult<TxHandle>,
    },
    Confirmation {
        attempt: AttemptId,
        handle: TxHandle,
        result: ChainResult<Confirmation>,
    },
    Balance {
        ticket: ReadTicket,
        result: ChainResult<U256>,
    },
}

/// Presentation-facing side of a running manager.
///
/// Cloning shares the same manager. The manager stops on [`unmount`] or
/// when every handle is dropped.
///
/// [`unmount`]: MintHandle::unmount
#[derive(Clone)]
pub struct MintHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<MintState>,
    balance: watch::Receiver<BalanceView>,
}

impl MintHandle {
    /// Request a new mint. Returns once the manager has applied the request;
    /// on `Accepted` the published state is already `Submitting`.
    pub async fn submit(&self, input: impl Into<MintInput>) -> SubmitOutcome {
        let (reply, outcome) = oneshot::channel();
        let command = Command::Submit {
            input: input.into(),
            reply,
        };
        if self.commands.send(command).is_err() {
            return SubmitOutcome::Unmounted;
        }
        outcome.await.unwrap_or(SubmitOutcome::Unmounted)
    }

    /// Ask for a fresh balance read. No-op while disconnected.
    pub fn refresh_balance(&self) {
        let _ = self.commands.send(Command::RefreshBalance);
    }

    /// Stop forwarding resolutions into state and end the manager task.
    pub fn unmount(&self) {
        let _ = self.commands.send(Command::Unmount);
    }

    pub fn state(&self) -> MintState {
        self.state.borrow().clone()
    }

    pub fn balance(&self) -> BalanceView {
        self.balance.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<MintState> {
        self.state.clone()
    }

    pub fn watch_balance(&self) -> watch::Receiver<BalanceView> {
        self.balance.clone()
    }

    /// Wait until no balance read is outstanding and return the view.
    ///
    /// A read issued together with a state change is already visible here
    /// once that state is observed, so this never misses a refresh that
    /// finished early. Returns `None` if the manager stops first.
    pub async fn settled_balance(&self) -> Option<BalanceView> {
        let mut rx = self.balance.clone();
        let view = rx.wait_for(|view| !view.refreshing).await.ok()?;
        Some(view.clone())
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// Returns `None` if the manager stops first.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Option<MintState>
    where
        F: FnMut(&MintState) -> bool,
    {
        let mut rx = self.state.clone();
        loop {
            {
                let current = rx.borrow_and_update();
                if predicate(&current) {
                    return Some(current.clone());
                }
            }
            rx.changed().await.ok()?;
        }
    }
}

/// Owner of the lifecycle state.
pub struct MintManager {
    machine: MintMachine,
    gateways: Gateways,
    resolutions_tx: mpsc::UnboundedSender<Resolution>,
    state_tx: watch::Sender<MintState>,
    balance_tx: watch::Sender<BalanceView>,
}

impl MintManager {
    /// Mount a manager for `session` and start it on the current runtime.
    pub fn spawn(
        gateways: Gateways,
        session: SessionSubscription,
        settings: ManagerSettings,
    ) -> (MintHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (resolutions_tx, resolutions_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(MintState::Idle);
        let (balance_tx, balance_rx) = watch::channel(BalanceView::default());

        let manager = Self {
            machine: MintMachine::new(session.initial, settings.reason_max_len),
            gateways,
            resolutions_tx,
            state_tx,
            balance_tx,
        };
        let task = tokio::spawn(manager.run(commands_rx, resolutions_rx, session.updates));

        let handle = MintHandle {
            commands: commands_tx,
            state: state_rx,
            balance: balance_rx,
        };
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut resolutions: mpsc::UnboundedReceiver<Resolution>,
        mut sessions: mpsc::UnboundedReceiver<Session>,
    ) {
        tracing::info!(session = ?self.machine.session(), "Mint manager mounted");
        let effect = self.machine.mount();
        self.dispatch(effect);
        self.publish();

        let mut sessions_open = true;
        loop {
            tokio::select! {
                biased;

                update = sessions.recv(), if sessions_open => match update {
                    Some(session) => {
                        let effect = self.machine.session_changed(session);
                        self.dispatch(effect);
                    }
                    None => {
                        tracing::warn!("Session provider dropped, keeping last known session");
                        sessions_open = false;
                    }
                },

                command = commands.recv() => match command {
                    Some(Command::Submit { input, reply }) => {
                        let (outcome, effect) = self.machine.submit(input);
                        self.dispatch(effect);
                        self.publish();
                        let _ = reply.send(outcome);
                    }
                    Some(Command::RefreshBalance) => {
                        let effect = self.machine.refresh_balance();
                        self.dispatch(effect);
                    }
                    Some(Command::Unmount) | None => break,
                },

                Some(resolution) = resolutions.recv() => {
                    let effect = self.resolve(resolution);
                    self.dispatch(effect);
                }
            }
            self.publish();
        }

        tracing::info!(state = %self.machine.state(), "Mint manager unmounted");
    }

    fn resolve(&mut self, resolution: Resolution) -> Option<Effect> {
        match resolution {
            Resolution::Write { attempt, result } => self.machine.write_resolved(attempt, result),
            Resolution::Confirmation { attempt, handle, result } => {
                self.machine.confirmation_resolved(attempt, handle, result)
            }
            Resolution::Balance { ticket, result } => {
                self.machine.balance_resolved(ticket, result);
                None
            }
        }
    }

    fn dispatch(&self, effect: Option<Effect>) {
        let Some(effect) = effect else {
            return;
        };
        let tx = self.resolutions_tx.clone();

        match effect {
            Effect::Submit { attempt, input } => {
                let write = self.gateways.write.clone();
                tokio::spawn(async move {
                    let result = write.submit(&input).await;
                    let _ = tx.send(Resolution::Write { attempt, result });
                });
            }
            Effect::Watch { attempt, handle } => {
                let watcher = self.gateways.watcher.clone();
                tokio::spawn(async move {
                    let result = watcher.watch(handle).await;
                    let _ = tx.send(Resolution::Confirmation { attempt, handle, result });
                });
            }
            Effect::ReadBalance { ticket, account } => {
                let read = self.gateways.read.clone();
                tokio::spawn(async move {
                    let result = read.badge_balance(account).await;
                    let _ = tx.send(Resolution::Balance { ticket, result });
                });
            }
        }
    }

    /// Balance goes out first: whoever observes a state already sees the
    /// read that transition started.
    fn publish(&self) {
        let balance = self.machine.balance();
        self.balance_tx.send_if_modified(|current| {
            if current != balance {
                *current = balance.clone();
                true
            } else {
                false
            }
        });

        let state = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if current != state {
                *current = state.clone();
                true
            } else {
                false
            }
        });
    }
}
