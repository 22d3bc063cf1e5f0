//! Capture metrics emitted by a closure with a local debugging recorder.

use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder},
};

/// Metrics recorded by one [`capture_metrics`] call.
///
/// The debugging recorder resets counters whenever it is read, so the
/// snapshot is taken once and every lookup reads from this copy.
#[derive(Debug)]
pub struct CapturedMetrics {
    entries: Vec<(CompositeKey, DebugValue)>,
}

impl CapturedMetrics {
    /// Value of the counter called `name`, if it was recorded.
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.entries.iter().find_map(|(key, value)| match value {
            DebugValue::Counter(c) if key.key().name() == name => Some(*c),
            _ => None,
        })
    }
}

/// Run `f` with a thread-local [`DebuggingRecorder`] installed and return
/// what it recorded.
pub fn capture_metrics(f: impl FnOnce()) -> CapturedMetrics {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    metrics::with_local_recorder(&recorder, f);
    let entries = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, value)| (key, value))
        .collect();
    CapturedMetrics { entries }
}

/// Value of the counter called `name` in `captured`, if it was recorded.
#[must_use]
pub fn counter_value(captured: &CapturedMetrics, name: &str) -> Option<u64> {
    captured.counter(name)
}
