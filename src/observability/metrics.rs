//! Metrics collection.
//!
//! # Metrics
//! - `instance_health_checks_total` (counter): checks by resulting status
//! - `instance_health_check_duration_seconds` (histogram): per-check latency
//! - `instance_health_batch_size` (histogram): instances per batch
//! - `instance_health_batch_concurrency` (gauge): pool size of the last batch
//!
//! Only the `metrics` facade is used; without an installed recorder these
//! calls are no-ops.

use std::time::Duration;

use crate::health::HealthState;

/// Record the outcome of a single check.
pub fn record_check(state: HealthState, elapsed: Duration) {
    ::metrics::counter!("instance_health_checks_total", "status" => state.as_str()).increment(1);
    ::metrics::histogram!("instance_health_check_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record the shape of a batch.
pub fn record_batch(instances: usize, concurrency: usize) {
    ::metrics::histogram!("instance_health_batch_size").record(instances as f64);
    ::metrics::gauge!("instance_health_batch_concurrency").set(concurrency as f64);
}
