//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ConfigIssue};

/// Overrides the contract address from the file.
pub const CONTRACT_ADDR_ENV_VAR: &str = "BADGE_MINT_CONTRACT_ADDR";
/// Overrides the wallet-connect project id from the file.
pub const PROJECT_ID_ENV_VAR: &str = "BADGE_MINT_PROJECT_ID";
/// Overrides the primary RPC URL from the file.
pub const RPC_URL_ENV_VAR: &str = "BADGE_MINT_RPC_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value in {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join(issues: &[ConfigIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load, override from the process environment and validate.
///
/// Without a path the defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |var| std::env::var(var).ok())
}

/// As [`load_config`], with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        network = config.network.kind.name(),
        contract = %config.contract.address,
        "Configuration loaded"
    );
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = env(CONTRACT_ADDR_ENV_VAR) {
        config.contract.address = addr.trim().parse().map_err(|e| ConfigError::Env {
            var: CONTRACT_ADDR_ENV_VAR,
            message: format!("{}", e),
        })?;
    }
    if let Some(project_id) = env(PROJECT_ID_ENV_VAR) {
        config.app.project_id = project_id;
    }
    if let Some(url) = env(RPC_URL_ENV_VAR) {
        config.network.rpc_url = Some(url);
    }
    Ok(())
}
