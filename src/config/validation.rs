//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, preview lengths)
//! - Require the identifiers the app cannot run without
//!
//! Returns every problem found, not just the first.

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("contract.address must be set to the deployed badge contract")]
    MissingContract,

    #[error("app.project_id must not be empty")]
    MissingProjectId,

    #[error("invalid RPC URL '{0}'")]
    InvalidRpcUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.contract.address.is_zero() {
        issues.push(ConfigIssue::MissingContract);
    }
    if config.app.project_id.trim().is_empty() {
        issues.push(ConfigIssue::MissingProjectId);
    }

    let network = &config.network;
    for url in std::iter::once(network.rpc_url()).chain(network.failover_urls.iter().map(String::as_str)) {
        if url.parse::<url::Url>().is_err() {
            issues.push(ConfigIssue::InvalidRpcUrl(url.to_string()));
        }
    }

    let positive = [
        ("network.rpc_timeout_secs", network.rpc_timeout_secs),
        ("network.confirmation_timeout_secs", network.confirmation_timeout_secs),
        ("network.poll_interval_ms", network.poll_interval_ms),
        ("mint.reason_max_len", config.mint.reason_max_len as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            issues.push(ConfigIssue::Zero(field));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
