//! Teardown path: fail every buffered entry when the connection closes.

use log::{error, info};

use super::PipelineSequencer;
use crate::{error::CompletionError, panic::catch_sink_panic, registry::Slot, sink::CompletionSink};

/// What a call to [`PipelineSequencer::drain_all`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Sinks resolved with [`CompletionError::ConnectionClosed`].
    pub notified: usize,
    /// Observed requests that never received a response.
    pub abandoned: usize,
    /// Sinks that panicked while being resolved.
    pub sink_panics: usize,
}

impl DrainSummary {
    /// Total number of entries removed from the registry.
    #[must_use]
    pub fn entries(&self) -> usize { self.notified + self.abandoned }
}

impl<R, S> PipelineSequencer<R, S>
where
    S: CompletionSink,
{
    /// Fail every outstanding entry and close the sequencer.
    ///
    /// Ready entries have their sinks resolved with
    /// [`CompletionError::ConnectionClosed`]; pending entries are discarded,
    /// and any later submission for them is rejected (and its sink failed)
    /// by [`PipelineSequencer::submit`]. A panicking sink is logged and
    /// skipped so the remaining sinks are still notified. Sinks run after
    /// the lock is released and may call back into the sequencer.
    ///
    /// Calling this again is a no-op.
    pub fn drain_all(&self) -> DrainSummary {
        let entries = self.lock().registry.drain();
        if entries.is_empty() {
            return DrainSummary::default();
        }
        crate::metrics::record_drained(entries.len());

        let mut summary = DrainSummary::default();
        for (sequence, slot) in entries {
            let Slot::Ready { sink, .. } = slot else {
                summary.abandoned += 1;
                continue;
            };
            summary.notified += 1;
            if let Err(panic_msg) =
                catch_sink_panic(|| sink.complete(Err(CompletionError::ConnectionClosed)))
            {
                summary.sink_panics += 1;
                crate::metrics::inc_sink_panics();
                // Emit via both `log` and `tracing` for tests that capture either.
                error!(
                    "unexpected error while releasing pipelined responses: sequence={sequence}, \
                     panic={panic_msg}"
                );
                tracing::error!(%sequence, panic = %panic_msg, "completion sink panicked during drain");
            }
        }
        info!(
            "pipeline drained: notified={}, abandoned={}, sink_panics={}",
            summary.notified, summary.abandoned, summary.sink_panics
        );
        summary
    }
}
