#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for the sequencer using loom.
//!
//! These tests drive `PipelineSequencer` from several threads without Tokio.
//! `loom` explores interleavings to check that responses are released exactly
//! once and in arrival order, and that a drain racing a submission resolves
//! the submitted sink exactly once.

use loom::{
    model,
    sync::{Arc, Mutex},
    thread,
};
use pipeline_sequencer::{
    CompletionError,
    CompletionSink,
    PipelineSequencer,
    RequestHandle,
    SequencerConfig,
    WriteOutcome,
};

type Outcomes = Arc<Mutex<Vec<(u8, WriteOutcome)>>>;

/// Sink reporting its outcome into a loom-tracked log.
struct LoomSink {
    tag: u8,
    outcomes: Outcomes,
}

impl CompletionSink for LoomSink {
    fn complete(self, outcome: WriteOutcome) {
        self.outcomes
            .lock()
            .expect("outcome lock poisoned")
            .push((self.tag, outcome));
    }
}

type Sequencer = PipelineSequencer<u8, LoomSink>;

fn sequencer(limit: usize) -> Arc<Sequencer> {
    Arc::new(PipelineSequencer::new(
        SequencerConfig::new(limit).expect("non-zero limit"),
    ))
}

fn submit_on_thread(
    seq: &Arc<Sequencer>,
    outcomes: &Outcomes,
    handle: RequestHandle,
    tag: u8,
) -> thread::JoinHandle<Vec<u8>> {
    let seq = Arc::clone(seq);
    let outcomes = Arc::clone(outcomes);
    thread::spawn(move || {
        seq.submit(handle, tag, LoomSink { tag, outcomes })
            .map(|batch| batch.into_iter().map(|released| released.response).collect())
            .unwrap_or_default()
    })
}

#[test]
fn concurrent_submits_release_each_response_once_in_order() {
    model(|| {
        let seq = sequencer(3);
        let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
        let h0 = seq.observe().expect("observe h0");
        let h1 = seq.observe().expect("observe h1");
        let h2 = seq.observe().expect("observe h2");

        let t1 = submit_on_thread(&seq, &outcomes, h1, 1);
        let t2 = submit_on_thread(&seq, &outcomes, h2, 2);
        let head: Vec<u8> = seq
            .submit(h0, 0, LoomSink { tag: 0, outcomes: Arc::clone(&outcomes) })
            .expect("submit h0")
            .into_iter()
            .map(|released| released.response)
            .collect();

        let mut batches = vec![head];
        batches.push(t1.join().expect("first submitter panicked"));
        batches.push(t2.join().expect("second submitter panicked"));
        batches.retain(|batch| !batch.is_empty());
        batches.sort_by_key(|batch| batch[0]);
        let wire: Vec<u8> = batches.into_iter().flatten().collect();

        assert_eq!(wire, vec![0, 1, 2]);
        assert_eq!(seq.outstanding(), 0);
        assert!(
            outcomes.lock().expect("outcome lock poisoned").is_empty(),
            "released sinks are left to the writer"
        );
    });
}

#[test]
fn drain_racing_submit_resolves_sink_once() {
    model(|| {
        let seq = sequencer(2);
        let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
        let _h0 = seq.observe().expect("observe h0");
        let h1 = seq.observe().expect("observe h1");

        let submitter = submit_on_thread(&seq, &outcomes, h1, 1);
        let drainer = {
            let seq = Arc::clone(&seq);
            thread::spawn(move || seq.drain_all())
        };

        let released = submitter.join().expect("submitter panicked");
        let _summary = drainer.join().expect("drainer panicked");

        assert!(released.is_empty(), "sequence 0 never answered");
        assert!(seq.is_drained());
        assert_eq!(
            *outcomes.lock().expect("outcome lock poisoned"),
            vec![(1, Err(CompletionError::ConnectionClosed))]
        );
    });
}
