//! Navigation metrics.
//!
//! # Metrics
//! - `navigation_requests_total` (counter): top-level navigations by outcome
//!   (`handled`, `unhandled`, `error`)
//! - `navigation_unroutable_total` (counter): dead-end requests by reason
//! - `navigation_duration_seconds` (histogram): per-region traversal time
//! - `navigation_in_flight` (gauge): region traversals currently running
//!
//! # Design Decisions
//! - Thin wrappers over the `metrics` facade so call sites stay one line
//! - Label values are static strings; no per-route cardinality

use std::time::Duration;

pub fn navigation_started() {
    ::metrics::gauge!("navigation_in_flight").increment(1.0);
}

pub fn navigation_finished(elapsed: Duration) {
    ::metrics::gauge!("navigation_in_flight").decrement(1.0);
    ::metrics::histogram!("navigation_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_outcome(outcome: &'static str) {
    ::metrics::counter!("navigation_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_unroutable(reason: &'static str) {
    ::metrics::counter!("navigation_unroutable_total", "reason" => reason).increment(1);
}
