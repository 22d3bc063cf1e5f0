//! Per-connection response sequencer.
//!
//! [`PipelineSequencer`] hands out sequence tags as request boundaries are
//! decoded and buffers responses that complete out of order, releasing them
//! to the write path strictly in arrival order. All state sits behind a
//! single mutex; operations never block beyond that lock and are bounded by
//! the number of buffered entries.

mod drain;

use std::sync::PoisonError;
#[cfg(not(loom))]
use std::sync::{Mutex, MutexGuard};

pub use drain::DrainSummary;
use log::{debug, error, warn};
#[cfg(loom)]
use loom::sync::{Mutex, MutexGuard};

use crate::{
    config::SequencerConfig,
    error::{CompletionError, SequencerError},
    registry::{CompletionRegistry, ReleaseBatch},
    sequence::{RequestHandle, Sequence, SequenceCounter},
    sink::CompletionSink,
};

/// Mutable state guarded by the sequencer lock.
struct EngineState<R, S> {
    counter: SequenceCounter,
    registry: CompletionRegistry<R, S>,
}

/// Orders responses for one pipelined connection.
///
/// Share it between the decode path and response producers with an
/// [`std::sync::Arc`]; every method takes `&self`.
///
/// # Examples
///
/// ```
/// use pipeline_sequencer::{FnSink, PipelineSequencer, SequencerConfig, WriteOutcome};
///
/// // Every sink passed to one sequencer shares a single type.
/// let noop: fn(WriteOutcome) = |_| {};
/// let config = SequencerConfig::new(3).expect("non-zero limit");
/// let sequencer = PipelineSequencer::new(config);
/// let h0 = sequencer.observe().expect("capacity available");
/// let h1 = sequencer.observe().expect("capacity available");
///
/// let early = sequencer.submit(h1, "second", FnSink::new(noop)).expect("valid handle");
/// assert!(early.is_empty());
///
/// let batch = sequencer.submit(h0, "first", FnSink::new(noop)).expect("valid handle");
/// let order: Vec<_> = batch.into_iter().map(|released| released.response).collect();
/// assert_eq!(order, ["first", "second"]);
/// ```
pub struct PipelineSequencer<R, S> {
    config: SequencerConfig,
    state: Mutex<EngineState<R, S>>,
}

impl<R, S> PipelineSequencer<R, S>
where
    S: CompletionSink,
{
    /// Create a sequencer with an empty registry.
    #[must_use]
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(EngineState {
                counter: SequenceCounter::default(),
                registry: CompletionRegistry::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState<R, S>> {
        // Sinks and logging run after the guard is dropped, so a poisoned
        // lock still guards consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a newly decoded request and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Overflow`] if registering the request would
    /// exceed the configured maximum, and [`SequencerError::Closed`] once the
    /// sequencer has been drained or has run out of sequence tags. Both are
    /// fatal to the connection.
    pub fn observe(&self) -> Result<RequestHandle, SequencerError> {
        let mut state = self.lock();
        if state.registry.release_cursor() == Sequence::TERMINAL {
            return Err(SequencerError::Closed);
        }
        let limit = self.config.max_outstanding();
        if state.registry.len() >= limit {
            let next = state.counter.peek();
            drop(state);
            crate::metrics::inc_overflows();
            warn!("pipelined request limit reached: sequence={next}, max_outstanding={limit}");
            return Err(SequencerError::Overflow { limit });
        }
        let Some(handle) = state.counter.issue() else {
            drop(state);
            error!("sequence tags exhausted; refusing further requests");
            return Err(SequencerError::Closed);
        };
        state.registry.push_pending();
        drop(state);
        crate::metrics::inc_outstanding();
        debug!("request observed: sequence={}", handle.sequence());
        Ok(handle)
    }

    /// Buffer `response` for `handle` and release every response that is
    /// now contiguous with the release cursor.
    ///
    /// The returned batch is in wire order and may be empty. The caller
    /// writes each response and resolves its sink with the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::InvalidState`] if the sequence was already
    /// released, already holds a response, was never observed, or the
    /// sequencer was drained. The state is left untouched and `sink` is
    /// resolved with [`CompletionError::ConnectionClosed`] before returning.
    pub fn submit(
        &self,
        handle: RequestHandle,
        response: R,
        sink: S,
    ) -> Result<ReleaseBatch<R, S>, SequencerError> {
        let sequence = handle.sequence();
        let mut state = self.lock();
        let offset = match state.registry.check_vacant(sequence, state.counter.peek()) {
            Ok(offset) => offset,
            Err(reason) => {
                drop(state);
                crate::metrics::inc_invalid_submissions();
                error!("rejected pipelined response: sequence={sequence}, reason={reason}");
                sink.complete(Err(CompletionError::ConnectionClosed));
                return Err(SequencerError::InvalidState { sequence, reason });
            }
        };
        state.registry.fill(offset, response, sink);
        let batch = state.registry.release_ready();
        let cursor = state.registry.release_cursor();
        drop(state);
        if !batch.is_empty() {
            crate::metrics::record_released(batch.len());
            debug!(
                "responses released: sequence={sequence}, released={}, release_cursor={cursor}",
                batch.len()
            );
        }
        Ok(batch)
    }

    /// Number of requests observed but not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize { self.lock().registry.len() }

    /// Sequence of the next response allowed onto the wire, or `None` once
    /// drained.
    #[must_use]
    pub fn release_cursor(&self) -> Option<Sequence> {
        let cursor = self.lock().registry.release_cursor();
        (cursor != Sequence::TERMINAL).then_some(cursor)
    }

    /// Sequence the next observed request will receive.
    #[must_use]
    pub fn next_sequence(&self) -> Sequence { self.lock().counter.peek() }

    /// Returns `true` once [`PipelineSequencer::drain_all`] has run.
    #[must_use]
    pub fn is_drained(&self) -> bool { self.lock().registry.release_cursor() == Sequence::TERMINAL }

    /// Configured outstanding-entry limit.
    #[must_use]
    pub fn max_outstanding(&self) -> usize { self.config.max_outstanding() }
}

impl<R, S> std::fmt::Debug for PipelineSequencer<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineSequencer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
