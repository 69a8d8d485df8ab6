//! Metrics recording.
//!
//! # Metrics
//! - `mint_transitions_total` (counter): lifecycle transitions by target state
//! - `mint_submit_total` (counter): submit requests by outcome
//! - `mint_stale_discarded_total` (counter): resolutions dropped as stale, by kind
//! - `mint_balance_refresh_total` (counter): balance reads by result
//! - `mint_rpc_latency_ms` (histogram): RPC calls by method and result
//!
//! Names follow Prometheus conventions so any exporter can pick them up as-is.
//! Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};
use std::time::Duration;

pub const TRANSITIONS: &str = "mint_transitions_total";
pub const SUBMITS: &str = "mint_submit_total";
pub const STALE_DISCARDED: &str = "mint_stale_discarded_total";
pub const BALANCE_REFRESHES: &str = "mint_balance_refresh_total";
pub const RPC_LATENCY: &str = "mint_rpc_latency_ms";

pub fn record_transition(to: &'static str) {
    counter!(TRANSITIONS, "to" => to).increment(1);
}

pub fn record_submit(outcome: &'static str) {
    counter!(SUBMITS, "outcome" => outcome).increment(1);
}

pub fn record_stale(kind: &'static str) {
    counter!(STALE_DISCARDED, "kind" => kind).increment(1);
}

pub fn record_balance_refresh(result: &'static str) {
    counter!(BALANCE_REFRESHES, "result" => result).increment(1);
}

pub fn record_rpc(method: &'static str, result: &'static str, elapsed: Duration) {
    histogram!(RPC_LATENCY, "method" => method, "result" => result)
        .record(elapsed.as_secs_f64() * 1_000.0);
}
