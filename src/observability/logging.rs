//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output is
//! opt-in through `observability.json_logs`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(false)).try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

fn default_directives(level: &str) -> String {
    format!("badge_mint={level},alloy=warn")
}
