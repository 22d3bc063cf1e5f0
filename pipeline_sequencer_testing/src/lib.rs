//! Test helpers for `pipeline_sequencer`.
//!
//! Provides completion sinks that record what they were resolved with, a
//! serialised handle to the global `logtest` logger, a metrics snapshot
//! helper and assertion macros for sequencer calls.
//!
//! ```rust
//! use pipeline_sequencer::{PipelineSequencer, SequencerConfig};
//! use pipeline_sequencer_testing::{Recorder, observe_expect, submit_expect};
//!
//! let recorder = Recorder::default();
//! let sequencer = PipelineSequencer::new(SequencerConfig::new(2).expect("non-zero limit"));
//! let handle = observe_expect!(sequencer);
//! let batch = submit_expect!(sequencer, handle, "pong", recorder.sink());
//! assert_eq!(batch.len(), 1);
//! ```

pub mod logging;
pub mod macros;
pub mod metrics;
pub mod recording;

pub use logging::{LoggerHandle, logger};
pub use metrics::{CapturedMetrics, capture_metrics, counter_value};
pub use recording::{Recorder, RecordingSink};
