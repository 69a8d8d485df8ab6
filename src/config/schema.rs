//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the minter.
//! All types derive Serde traits for deserialization from config files.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Chain and RPC settings.
    pub network: NetworkConfig,

    /// Badge contract location.
    pub contract: ContractConfig,

    /// Application identity shown to wallets.
    pub app: AppMetadata,

    /// Mint flow presentation settings.
    pub mint: MintConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Supported networks. The first listed is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    #[default]
    BaseSepolia,
    Base,
}

impl NetworkKind {
    pub fn chain_id(self) -> u64 {
        match self {
            NetworkKind::BaseSepolia => 84532,
            NetworkKind::Base => 8453,
        }
    }

    /// Public RPC endpoint used when none is configured.
    pub fn default_rpc_url(self) -> &'static str {
        match self {
            NetworkKind::BaseSepolia => "https://sepolia.base.org",
            NetworkKind::Base => "https://mainnet.base.org",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NetworkKind::BaseSepolia => "Base Sepolia",
            NetworkKind::Base => "Base",
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Which chain to talk to.
    pub kind: NetworkKind,

    /// JSON-RPC endpoint URL; the network's public endpoint if unset.
    pub rpc_url: Option<String>,

    /// Failover JSON-RPC endpoint URLs for reads.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,

    /// Give up watching a transaction after this many seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl NetworkConfig {
    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or_else(|| self.kind.default_rpc_url())
    }

    pub fn chain_id(&self) -> u64 {
        self.kind.chain_id()
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            kind: NetworkKind::default(),
            rpc_url: None,
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 2000,
        }
    }
}

/// Deployed badge contract.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract address. Must be set; zero is rejected by validation.
    pub address: Address,

    /// Token id whose balance is displayed.
    pub badge_id: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            badge_id: 1,
        }
    }
}

/// Application metadata presented to wallets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,

    /// Wallet-connect project identifier.
    pub project_id: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "BaseBadge".to_string(),
            description: "Mint daily badges on Base network".to_string(),
            url: "https://basebadge.vercel.app".to_string(),
            icons: vec!["https://avatars.githubusercontent.com/u/37784886".to_string()],
            project_id: String::new(),
        }
    }
}

/// Mint flow presentation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MintConfig {
    /// Maximum characters of a failure message shown to the user.
    pub reason_max_len: usize,

    /// Leading characters of the transaction preview (including `0x`).
    pub tx_preview_head: usize,

    /// Trailing characters of the transaction preview.
    pub tx_preview_tail: usize,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            reason_max_len: 100,
            tx_preview_head: 10,
            tx_preview_tail: 8,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
