//! Contract gateways backed by JSON-RPC.
//!
//! - [`ContractReader`]: `balanceOf` through the failover [`ChainClient`]
//! - [`ContractWriter`]: `mintDailyBadge` through a signing provider
//!
//! Writes are sent once to the primary endpoint. A failed send is reported
//! to the manager and never retried here.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::client::{ChainClient, DynProvider};
use crate::blockchain::contract::{balance_of_calldata, decode_balance, mint_calldata};
use crate::blockchain::types::{ChainError, ChainResult};
use crate::blockchain::wallet::Wallet;
use crate::config::{ContractConfig, NetworkConfig};
use crate::mint::gateway::{ReadGateway, WriteGateway};
use crate::mint::types::{MintInput, TxHandle};

/// Reads the badge balance of an account.
#[derive(Debug, Clone)]
pub struct ContractReader {
    client: ChainClient,
    contract: Address,
    badge_id: u64,
}

impl ContractReader {
    pub fn new(client: ChainClient, contract: &ContractConfig) -> Self {
        Self {
            client,
            contract: contract.address,
            badge_id: contract.badge_id,
        }
    }
}

#[async_trait]
impl ReadGateway for ContractReader {
    async fn badge_balance(&self, account: Address) -> ChainResult<U256> {
        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(balance_of_calldata(account, self.badge_id));
        let data = self.client.call(tx).await?;
        let balance = decode_balance(&data)?;
        tracing::debug!(%account, badge_id = self.badge_id, %balance, "Badge balance read");
        Ok(balance)
    }
}

/// Submits mint transactions signed by the local wallet.
#[derive(Clone)]
pub struct ContractWriter {
    provider: DynProvider,
    from: Address,
    contract: Address,
    timeout_duration: Duration,
}

impl ContractWriter {
    pub fn new(network: &NetworkConfig, contract: &ContractConfig, wallet: &Wallet) -> ChainResult<Self> {
        let url: url::Url = network.rpc_url().parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", network.rpc_url(), e))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url);

        Ok(Self {
            provider: Arc::new(provider) as DynProvider,
            from: wallet.address(),
            contract: contract.address,
            timeout_duration: Duration::from_secs(network.rpc_timeout_secs),
        })
    }

    /// The mint call for `input`. The answer goes on-chain exactly as typed.
    fn mint_request(&self, input: &MintInput) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.contract)
            .with_input(mint_calldata(&input.text))
    }
}

#[async_trait]
impl WriteGateway for ContractWriter {
    async fn submit(&self, input: &MintInput) -> ChainResult<TxHandle> {
        let tx = self.mint_request(input);
        let pending = timeout(self.timeout_duration, self.provider.send_transaction(tx))
            .await
            .map_err(|_| ChainError::Timeout(self.timeout_duration.as_secs()))?
            .map_err(classify_send_error)?;

        let handle = TxHandle::new(*pending.tx_hash());
        tracing::info!(tx = %handle, from = %self.from, contract = %self.contract, "Mint transaction sent");
        Ok(handle)
    }
}

impl std::fmt::Debug for ContractWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractWriter")
            .field("from", &self.from)
            .field("contract", &self.contract)
            .finish()
    }
}

/// Map a send failure onto the chain error taxonomy.
fn classify_send_error(error: impl std::fmt::Display) -> ChainError {
    let message = error.to_string();
    let lower = message.to_lowercase();
    if lower.contains("execution reverted") {
        ChainError::Reverted(message)
    } else if lower.contains("denied") || lower.contains("rejected") {
        ChainError::Rejected(message)
    } else {
        ChainError::Rpc(message)
    }
}
