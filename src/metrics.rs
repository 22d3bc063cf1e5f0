//! Metric helpers for `pipeline_sequencer`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking entries read but not yet released.
pub const OUTSTANDING: &str = "pipeline_sequencer_outstanding";
/// Name of the counter tracking responses released to the write path.
pub const RELEASED_TOTAL: &str = "pipeline_sequencer_released_total";
/// Name of the counter tracking capacity guard trips.
pub const OVERFLOWS_TOTAL: &str = "pipeline_sequencer_overflows_total";
/// Name of the counter tracking rejected submissions.
pub const INVALID_SUBMISSIONS_TOTAL: &str = "pipeline_sequencer_invalid_submissions_total";
/// Name of the counter tracking entries failed by a drain.
pub const DRAINED_TOTAL: &str = "pipeline_sequencer_drained_total";
/// Name of the counter tracking completion sinks that panicked.
pub const SINK_PANICS_TOTAL: &str = "pipeline_sequencer_sink_panics_total";

/// Record a newly observed request.
pub fn inc_outstanding() {
    #[cfg(feature = "metrics")]
    gauge!(OUTSTANDING).increment(1.0);
}

/// Record `count` responses leaving the registry.
#[allow(clippy::cast_precision_loss, reason = "gauge values are approximate")]
pub fn record_released(count: usize) {
    #[cfg(feature = "metrics")]
    {
        gauge!(OUTSTANDING).decrement(count as f64);
        counter!(RELEASED_TOTAL).increment(count as u64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}

/// Record the capacity guard tripping.
pub fn inc_overflows() {
    #[cfg(feature = "metrics")]
    counter!(OVERFLOWS_TOTAL).increment(1);
}

/// Record a rejected submission.
pub fn inc_invalid_submissions() {
    #[cfg(feature = "metrics")]
    counter!(INVALID_SUBMISSIONS_TOTAL).increment(1);
}

/// Record `count` entries discarded by a drain.
#[allow(clippy::cast_precision_loss, reason = "gauge values are approximate")]
pub fn record_drained(count: usize) {
    #[cfg(feature = "metrics")]
    {
        gauge!(OUTSTANDING).decrement(count as f64);
        counter!(DRAINED_TOTAL).increment(count as u64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}

/// Record a completion sink panicking during a drain.
pub fn inc_sink_panics() {
    #[cfg(feature = "metrics")]
    counter!(SINK_PANICS_TOTAL).increment(1);
}
