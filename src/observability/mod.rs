//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! mint core, gateways, RPC client produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (plain or JSON lines)
//!     → whatever metrics recorder the embedding application installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
