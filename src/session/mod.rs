//! Wallet session provider.
//!
//! # Data Flow
//! ```text
//! wallet connect / disconnect / account switch
//!     → SessionProvider (current session)
//!     → every subscriber receives each change, in order
//!     → MintManager applies it before any other queued input
//! ```
//!
//! Updates are delivered per subscriber over unbounded channels so no
//! notification is coalesced away: a disconnect followed by a reconnect is
//! seen as two changes.

use alloy::primitives::Address;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::mint::types::Session;

/// Snapshot plus the stream of subsequent changes.
#[derive(Debug)]
pub struct SessionSubscription {
    pub initial: Session,
    pub updates: mpsc::UnboundedReceiver<Session>,
}

#[derive(Debug, Default)]
struct Inner {
    current: Session,
    subscribers: Vec<mpsc::UnboundedSender<Session>>,
}

/// Holds the wallet connection and pushes every change to subscribers.
#[derive(Debug, Clone, Default)]
pub struct SessionProvider {
    inner: Arc<Mutex<Inner>>,
}

impl SessionProvider {
    /// Provider starting disconnected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider starting connected to `address`.
    pub fn connected(address: Address) -> Self {
        let provider = Self::new();
        provider.connect(address);
        provider
    }

    pub fn current(&self) -> Session {
        self.lock().current
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        inner.subscribers.push(tx);
        SessionSubscription {
            initial: inner.current,
            updates: rx,
        }
    }

    /// Connect, or switch to `address` if already connected.
    pub fn connect(&self, address: Address) {
        self.publish(Session::connected(address));
    }

    pub fn switch_account(&self, address: Address) {
        self.connect(address);
    }

    pub fn disconnect(&self) {
        self.publish(Session::disconnected());
    }

    fn publish(&self, session: Session) {
        let mut inner = self.lock();
        if inner.current == session {
            return;
        }
        tracing::info!(
            connected = session.connected,
            address = ?session.address,
            "Wallet session changed"
        );
        inner.current = session;
        inner.subscribers.retain(|tx| tx.send(session).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock still holds a consistent session value.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
