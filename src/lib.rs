#![doc(html_root_url = "https://docs.rs/pipeline_sequencer/latest")]
//! Response ordering for pipelined request/response connections.
//!
//! A pipelined connection may have many requests in flight while the protocol
//! demands that responses go out in request order. [`PipelineSequencer`]
//! tags each request as it is decoded, buffers responses that finish early
//! and releases them to the write path strictly in arrival order, with a hard
//! cap on how many entries a single connection may buffer.
//! [`PipelineAdapter`] wires the sequencer into a tokio connection.

#[cfg(not(loom))]
pub mod adapter;
pub mod config;
pub mod error;
pub mod metrics;
pub mod panic;
pub mod registry;
pub mod sequence;
pub mod sequencer;
pub mod sink;

#[cfg(not(loom))]
pub use adapter::{OutboundQueue, PipelineAdapter, RequestTicket};
pub use config::SequencerConfig;
pub use error::{CompletionError, ConfigError, InvalidStateReason, SequencerError};
pub use registry::{ReleaseBatch, Released};
pub use sequence::{RequestHandle, Sequence};
pub use sequencer::{DrainSummary, PipelineSequencer};
pub use sink::{
    CompletionSender,
    CompletionSink,
    FnSink,
    WriteCompletion,
    WriteOutcome,
    completion_channel,
};
