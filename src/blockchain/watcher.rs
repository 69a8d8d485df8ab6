//! Receipt-polling confirmation watcher.
//!
//! # Responsibilities
//! - Poll the receipt of a submitted transaction
//! - Require the configured confirmation depth
//! - Report reverts as failures
//! - Give up after the configured deadline
//!
//! RPC errors while polling are treated as transient; only the deadline ends
//! a watch early.

use alloy::primitives::TxHash;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainResult, ConfirmationStatus};
use crate::mint::gateway::{Confirmation, ConfirmationWatcher};
use crate::mint::types::TxHandle;

#[derive(Debug, Clone)]
pub struct ReceiptWatcher {
    client: ChainClient,
    required_confirmations: u32,
    deadline: Duration,
    poll_interval: Duration,
}

impl ReceiptWatcher {
    pub fn new(client: ChainClient) -> Self {
        let config = client.config();
        Self {
            required_confirmations: config.confirmation_blocks.max(1),
            deadline: Duration::from_secs(config.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            client,
        }
    }

    /// Poll once.
    pub async fn check(&self, tx_hash: TxHash) -> ChainResult<ConfirmationStatus> {
        let Some(receipt) = self.client.get_transaction_receipt(tx_hash).await? else {
            return Ok(ConfirmationStatus::Pending);
        };
        if !receipt.status() {
            return Ok(ConfirmationStatus::Failed("Transaction reverted".to_string()));
        }

        let current_block = self.client.get_block_number().await?;
        let tx_block = receipt.block_number.unwrap_or(current_block);
        Ok(depth_status(tx_block, current_block, self.required_confirmations))
    }
}

#[async_trait]
impl ConfirmationWatcher for ReceiptWatcher {
    async fn watch(&self, handle: TxHandle) -> ChainResult<Confirmation> {
        let polled = timeout(self.deadline, async {
            loop {
                match self.check(handle.hash()).await {
                    Ok(ConfirmationStatus::Confirmed { block_number }) => {
                        return Confirmation::Confirmed { block_number };
                    }
                    Ok(ConfirmationStatus::Failed(detail)) => return Confirmation::Failed(detail),
                    Ok(status) => tracing::debug!(tx = %handle, ?status, "Waiting for confirmations"),
                    Err(e) => tracing::warn!(tx = %handle, error = %e, "Receipt poll failed"),
                }
                sleep(jittered(self.poll_interval)).await;
            }
        })
        .await;

        polled.map_err(|_| ChainError::ConfirmationTimeout(self.deadline.as_secs()))
    }
}

/// The block containing the transaction counts as its first confirmation.
fn depth_status(tx_block: u64, current_block: u64, required: u32) -> ConfirmationStatus {
    let confirmations = current_block.saturating_sub(tx_block).saturating_add(1);
    if confirmations >= u64::from(required) {
        ConfirmationStatus::Confirmed { block_number: tx_block }
    } else {
        ConfirmationStatus::Confirming {
            current: confirmations as u32,
            required,
        }
    }
}

/// Poll interval plus up to 10% jitter.
fn jittered(interval: Duration) -> Duration {
    let base_ms = interval.as_millis() as u64;
    let range = base_ms / 10;
    let jitter = if range > 0 { fastrand::u64(0..range) } else { 0 };
    Duration::from_millis(base_ms + jitter)
}
