//! Canonical error types for the crate.
//!
//! [`SequencerError`] is returned synchronously to whichever caller broke an
//! ordering invariant; the host is expected to close the connection when it
//! sees one. [`CompletionError`] travels the other way, through completion
//! sinks, to whoever waits on a response being written.

use thiserror::Error;

use crate::sequence::Sequence;

/// Why a submission was rejected.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStateReason {
    /// The sequence was released to the write path already.
    #[error("response already released")]
    AlreadyReleased,
    /// A response for the sequence is already buffered.
    #[error("response already submitted")]
    AlreadySubmitted,
    /// The sequence was never handed out by this sequencer.
    #[error("sequence was never observed")]
    Unobserved,
    /// The sequencer has been drained.
    #[error("sequencer drained")]
    Drained,
}

/// Errors raised by [`crate::PipelineSequencer`] operations.
///
/// Every variant is fatal to the connection that produced it.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SequencerError {
    /// Registering another request would exceed the outstanding limit.
    #[error("too many pipelined requests; max outstanding is {limit}")]
    Overflow {
        /// Configured maximum number of outstanding entries.
        limit: usize,
    },
    /// A response was submitted for a sequence that cannot accept one.
    #[error("invalid submission for sequence {sequence}: {reason}")]
    InvalidState {
        /// Sequence carried by the offending handle.
        sequence: Sequence,
        /// Rejection cause.
        reason: InvalidStateReason,
    },
    /// A request was observed after the sequencer was drained.
    #[error("sequencer closed")]
    Closed,
}

impl SequencerError {
    /// Returns `true` if this error signals the capacity guard tripping.
    #[must_use]
    pub fn is_overflow(&self) -> bool { matches!(self, Self::Overflow { .. }) }
}

/// Outcome delivered to a completion sink when its response is not written.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The connection closed before the response could be written.
    #[error("connection closed")]
    ConnectionClosed,
    /// The write path failed while writing the response.
    #[error("failed to write response: {0}")]
    Write(String),
}

/// Errors returned when building a [`crate::SequencerConfig`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The outstanding limit was zero.
    #[error("max outstanding must be at least 1")]
    ZeroCapacity,
}
