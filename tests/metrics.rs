#![cfg(not(loom))]
//! Tests for the sequencer metrics.
//!
//! Each test runs sequencer operations under a local
//! `metrics_util::debugging::DebuggingRecorder` and checks the counters they
//! emit.
use pipeline_sequencer::{
    FnSink,
    PipelineSequencer,
    SequencerConfig,
    metrics::{
        DRAINED_TOTAL,
        INVALID_SUBMISSIONS_TOTAL,
        OVERFLOWS_TOTAL,
        RELEASED_TOTAL,
        SINK_PANICS_TOTAL,
    },
};
use pipeline_sequencer_testing::{Recorder, RecordingSink, capture_metrics, counter_value};
use rstest::rstest;

fn sequencer(limit: usize) -> PipelineSequencer<u8, RecordingSink> {
    PipelineSequencer::new(SequencerConfig::new(limit).expect("non-zero limit"))
}

#[test]
fn released_responses_are_counted() {
    let recorder = Recorder::default();
    let captured = capture_metrics(|| {
        let seq = sequencer(4);
        let h0 = seq.observe().expect("observe h0");
        let h1 = seq.observe().expect("observe h1");
        let h2 = seq.observe().expect("observe h2");
        let _ = seq.submit(h2, 2, recorder.sink()).expect("submit h2");
        let _ = seq.submit(h1, 1, recorder.sink()).expect("submit h1");
        let _ = seq.submit(h0, 0, recorder.sink()).expect("submit h0");
    });
    assert_eq!(counter_value(&captured, RELEASED_TOTAL), Some(3));
}

#[test]
fn overflow_metric_increments() {
    let captured = capture_metrics(|| {
        let seq = sequencer(1);
        let _h0 = seq.observe().expect("observe h0");
        assert!(seq.observe().is_err_and(|e| e.is_overflow()));
        assert!(seq.observe().is_err_and(|e| e.is_overflow()));
    });
    assert_eq!(counter_value(&captured, OVERFLOWS_TOTAL), Some(2));
}

#[rstest]
#[case::already_submitted(false)]
#[case::drained(true)]
fn invalid_submission_metric_increments(#[case] drain_first: bool) {
    let recorder = Recorder::default();
    let captured = capture_metrics(|| {
        let seq = sequencer(2);
        let _h0 = seq.observe().expect("observe h0");
        let h1 = seq.observe().expect("observe h1");
        if drain_first {
            let _ = seq.drain_all();
        } else {
            let _ = seq.submit(h1, 1, recorder.sink()).expect("first submit");
        }
        assert!(seq.submit(h1, 1, recorder.sink()).is_err());
    });
    assert_eq!(counter_value(&captured, INVALID_SUBMISSIONS_TOTAL), Some(1));
}

#[test]
fn drain_metrics_count_entries_and_panics() {
    let recorder = Recorder::default();
    let captured = capture_metrics(|| {
        let seq = sequencer(3);
        let _h0 = seq.observe().expect("observe h0");
        let h1 = seq.observe().expect("observe h1");
        let h2 = seq.observe().expect("observe h2");
        let _ = seq.submit(h1, 1, recorder.panicking()).expect("submit h1");
        let _ = seq.submit(h2, 2, recorder.sink()).expect("submit h2");
        let _ = seq.drain_all();
    });
    assert_eq!(counter_value(&captured, DRAINED_TOTAL), Some(3));
    assert_eq!(counter_value(&captured, SINK_PANICS_TOTAL), Some(1));
}

#[test]
fn in_order_traffic_records_no_failures() {
    let captured = capture_metrics(|| {
        let seq = PipelineSequencer::new(SequencerConfig::new(2).expect("non-zero limit"));
        for tag in 0..4_u8 {
            let handle = seq.observe().expect("observe");
            let batch = seq.submit(handle, tag, FnSink::new(|_| {})).expect("submit");
            assert_eq!(batch.len(), 1);
        }
    });
    assert_eq!(counter_value(&captured, RELEASED_TOTAL), Some(4));
    assert_eq!(counter_value(&captured, OVERFLOWS_TOTAL), None);
    assert_eq!(counter_value(&captured, INVALID_SUBMISSIONS_TOTAL), None);
}
