//! Completion sinks report the final outcome of a response write.
//!
//! A sink is a one-shot capability: it is consumed when resolved, so the
//! type system guarantees each response is reported at most once. The
//! sequencer resolves sinks only with failures (drain or rejection); success
//! is reported by the write path once bytes are flushed.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot;

use crate::error::CompletionError;

/// Result reported through a [`CompletionSink`].
pub type WriteOutcome = Result<(), CompletionError>;

/// Receives the outcome of writing a single response.
///
/// Implementations must not block: sinks are resolved from the write path
/// and from connection teardown.
pub trait CompletionSink: Send + 'static {
    /// Resolve the sink with `outcome`.
    fn complete(self, outcome: WriteOutcome);
}

/// Sink backed by a closure.
///
/// ```
/// use pipeline_sequencer::{CompletionSink, FnSink};
///
/// let sink = FnSink::new(|outcome| assert!(outcome.is_ok()));
/// sink.complete(Ok(()));
/// ```
pub struct FnSink<F>(F);

impl<F> FnSink<F>
where
    F: FnOnce(WriteOutcome) + Send + 'static,
{
    /// Wrap `f` as a completion sink.
    pub fn new(f: F) -> Self { Self(f) }
}

impl<F> CompletionSink for FnSink<F>
where
    F: FnOnce(WriteOutcome) + Send + 'static,
{
    fn complete(self, outcome: WriteOutcome) { (self.0)(outcome) }
}

impl<F> std::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnSink(..)")
    }
}

/// Sink that forwards the outcome over a oneshot channel.
///
/// Create a connected pair with [`completion_channel`].
#[derive(Debug)]
pub struct CompletionSender(oneshot::Sender<WriteOutcome>);

impl CompletionSink for CompletionSender {
    fn complete(self, outcome: WriteOutcome) {
        // The waiter may have given up; nothing to report then.
        let _ = self.0.send(outcome);
    }
}

/// Future resolving to the outcome reported through a [`CompletionSender`].
///
/// If the sender is dropped without being resolved the future yields
/// [`CompletionError::ConnectionClosed`].
#[derive(Debug)]
#[must_use = "the write outcome is lost unless the completion is awaited"]
pub struct WriteCompletion(oneshot::Receiver<WriteOutcome>);

impl WriteCompletion {
    /// Return the outcome if it is already available.
    ///
    /// # Errors
    ///
    /// Returns the write failure if one was reported, or
    /// [`CompletionError::ConnectionClosed`] if the sender was dropped.
    /// Returns `Ok(None)` while the outcome is still pending.
    pub fn try_outcome(&mut self) -> Result<Option<()>, CompletionError> {
        match self.0.try_recv() {
            Ok(outcome) => outcome.map(Some),
            Err(oneshot::error::TryRecvError::Empty) => Ok(None),
            Err(oneshot::error::TryRecvError::Closed) => Err(CompletionError::ConnectionClosed),
        }
    }
}

impl Future for WriteCompletion {
    type Output = WriteOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(CompletionError::ConnectionClosed)))
    }
}

/// Create a connected [`CompletionSender`] and [`WriteCompletion`] pair.
#[must_use]
pub fn completion_channel() -> (CompletionSender, WriteCompletion) {
    let (tx, rx) = oneshot::channel();
    (CompletionSender(tx), WriteCompletion(rx))
}
