//! Blockchain RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the configured JSON-RPC endpoint plus failovers
//! - Query chain state (block number, receipts, contract calls)
//! - Handle timeouts and network errors gracefully
//!
//! Only idempotent reads go through here; transaction submission uses the
//! signing provider in `gateway.rs` and is never failed over.

use alloy::primitives::{Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::blockchain::types::{ChainError, ChainId, ChainResult, NetworkConfig};
use crate::observability::metrics;

pub type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Read-side RPC client with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new client and check the endpoint serves the configured chain.
    ///
    /// An unreachable or mismatched endpoint is logged, not fatal.
    pub async fn new(config: NetworkConfig) -> ChainResult<Self> {
        let client = Self::connect(config)?;

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %client.config.rpc_url(),
                    chain_id = client.config.chain_id(),
                    "Chain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Chain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Build the providers without touching the network.
    pub fn connect(config: NetworkConfig) -> ChainResult<Self> {
        let primary_url: url::Url = config.rpc_url().parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url(), e))
        })?;
        let mut providers = vec![Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider];

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        Ok(Self {
            providers,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id() {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id(),
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    pub async fn get_chain_id(&self) -> ChainResult<ChainId> {
        self.first_ok("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    pub async fn get_block_number(&self) -> ChainResult<u64> {
        self.first_ok("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }

    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> ChainResult<Option<TransactionReceipt>> {
        self.first_ok("eth_getTransactionReceipt", move |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Execute a read-only call.
    pub async fn call(&self, tx: TransactionRequest) -> ChainResult<Bytes> {
        self.first_ok("eth_call", move |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    /// Try each provider in order until one answers within the timeout.
    async fn first_ok<T, F, Fut>(&self, method: &'static str, op: F) -> ChainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            let started = Instant::now();
            match timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc(method, "ok", started.elapsed());
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    metrics::record_rpc(method, "error", started.elapsed());
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    metrics::record_rpc(method, "timeout", started.elapsed());
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
        }
        Err(ChainError::Rpc(format!("All RPC providers failed for {}", method)))
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url())
            .field("chain_id", &self.config.chain_id())
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
