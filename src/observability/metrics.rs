//! Metrics collection.
//!
//! # Metrics
//! - `issuance_transitions_total` (counter): state transitions by phase
//! - `issuance_outcomes_total` (counter): finished attempts by outcome
//! - `chain_rpc_failures_total` (counter): swallowed RPC failures by operation
//!
//! No recorder is installed by this crate; the counters are no-ops unless the
//! embedding process installs one.

use metrics::counter;

/// Record a state machine transition.
pub fn record_transition(phase: &'static str) {
    counter!("issuance_transitions_total", "phase" => phase).increment(1);
}

/// Record the outcome of a finished attempt.
pub fn record_outcome(outcome: &'static str) {
    counter!("issuance_outcomes_total", "outcome" => outcome).increment(1);
}

/// Record an RPC failure that was degraded instead of propagated.
pub fn record_rpc_failure(operation: &'static str) {
    counter!("chain_rpc_failures_total", "op" => operation).increment(1);
}
