//! Criterion benchmarks for the sequencer hot path.
//!
//! This benchmark suite covers:
//! - in-order traffic, where every submission releases itself,
//! - reverse-order traffic, where a single submission releases the window, and
//! - draining a full registry of ready entries.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use pipeline_sequencer::{
    FnSink,
    PipelineSequencer,
    RequestHandle,
    SequencerConfig,
    WriteOutcome,
};

type NoopSink = FnSink<fn(WriteOutcome)>;

const WINDOWS: [usize; 3] = [8, 64, 512];

fn noop_sink() -> NoopSink {
    let complete: fn(WriteOutcome) = |_| {};
    FnSink::new(complete)
}

fn sequencer(window: usize) -> PipelineSequencer<u64, NoopSink> {
    match SequencerConfig::new(window) {
        Ok(config) => PipelineSequencer::new(config),
        Err(err) => panic!("benchmark window must be non-zero: {err}"),
    }
}

fn observe_all(seq: &PipelineSequencer<u64, NoopSink>, window: usize) -> Vec<RequestHandle> {
    (0..window)
        .map(|_| match seq.observe() {
            Ok(handle) => handle,
            Err(err) => panic!("observe failed inside the window: {err}"),
        })
        .collect()
}

fn benchmark_in_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer/in_order");
    for window in WINDOWS {
        group.throughput(Throughput::Elements(window as u64));
        group.bench_function(BenchmarkId::from_parameter(window), |b| {
            b.iter(|| {
                let seq = sequencer(window);
                for tag in 0..window as u64 {
                    let handle = match seq.observe() {
                        Ok(handle) => handle,
                        Err(err) => panic!("observe failed inside the window: {err}"),
                    };
                    let batch = seq.submit(handle, tag, noop_sink());
                    black_box(batch.map(|released| released.len()).unwrap_or_default());
                }
            });
        });
    }
    group.finish();
}

fn benchmark_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer/reverse");
    for window in WINDOWS {
        group.throughput(Throughput::Elements(window as u64));
        group.bench_function(BenchmarkId::from_parameter(window), |b| {
            b.iter(|| {
                let seq = sequencer(window);
                let handles = observe_all(&seq, window);
                for (tag, handle) in (0..).zip(handles).rev() {
                    let batch = seq.submit(handle, tag, noop_sink());
                    black_box(batch.map(|released| released.len()).unwrap_or_default());
                }
            });
        });
    }
    group.finish();
}

fn benchmark_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer/drain");
    for window in WINDOWS {
        group.throughput(Throughput::Elements(window as u64));
        group.bench_function(BenchmarkId::from_parameter(window), |b| {
            b.iter(|| {
                let seq = sequencer(window);
                let handles = observe_all(&seq, window);
                // Leave the head pending so every other entry stays buffered.
                for (tag, handle) in (0..).zip(handles).skip(1) {
                    black_box(seq.submit(handle, tag, noop_sink()).is_ok());
                }
                black_box(seq.drain_all())
            });
        });
    }
    group.finish();
}

/// Entrypoint for sequencer release and drain benchmarks.
fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    benchmark_in_order(&mut criterion);
    benchmark_reverse(&mut criterion);
    benchmark_drain(&mut criterion);
    criterion.final_summary();
}
