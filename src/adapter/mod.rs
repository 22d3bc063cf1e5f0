//! Tokio adapter placing a [`PipelineSequencer`] between a connection's
//! decode path, its handlers and its socket writer.
//!
//! The decode path calls [`PipelineAdapter::on_request`] at every request
//! boundary and hands the returned [`RequestTicket`] to a handler task.
//! Handlers call [`PipelineAdapter::respond`] from any task, in any order.
//! Released responses are queued for [`OutboundQueue::write_all`], which
//! writes them to a [`futures::Sink`] in request order. Teardown goes through
//! [`PipelineAdapter::close`].
//!
//! The outstanding limit is enforced on requests that are read but not yet
//! written: every ticket holds a permit that is returned only after its
//! response leaves the writer.

mod writer;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
pub use writer::OutboundQueue;

use crate::{
    config::SequencerConfig,
    error::{CompletionError, SequencerError},
    registry::Released,
    sequence::{RequestHandle, Sequence},
    sequencer::{DrainSummary, PipelineSequencer},
    sink::{CompletionSender, CompletionSink, WriteCompletion, completion_channel},
};

/// A response travelling through the sequencer with its capacity permit.
#[derive(Debug)]
pub(crate) struct Queued<R> {
    pub(crate) response: R,
    pub(crate) permit: OwnedSemaphorePermit,
}

pub(crate) type Outbound<R> = Released<Queued<R>, CompletionSender>;

/// Proof that a request was observed, owed a response.
///
/// Dropping a ticket without responding keeps its slot pending until the
/// connection closes.
#[derive(Debug)]
#[must_use = "every observed request must be answered through `PipelineAdapter::respond`"]
pub struct RequestTicket {
    handle: RequestHandle,
    permit: OwnedSemaphorePermit,
}

impl RequestTicket {
    /// Sequence assigned to the request.
    #[must_use]
    pub fn sequence(&self) -> Sequence { self.handle.sequence() }
}

struct Shared<R> {
    sequencer: PipelineSequencer<Queued<R>, CompletionSender>,
    permits: Arc<Semaphore>,
    // Held from submit until the batch is queued so concurrent responders
    // cannot interleave their batches.
    outbound: Mutex<mpsc::UnboundedSender<Outbound<R>>>,
    shutdown: CancellationToken,
}

/// Cloneable per-connection front end to a [`PipelineSequencer`].
///
/// # Examples
///
/// ```
/// use pipeline_sequencer::{PipelineAdapter, SequencerConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let shutdown = CancellationToken::new();
/// let config = SequencerConfig::new(8).expect("non-zero limit");
/// let (adapter, outbound) = PipelineAdapter::<&str>::new(config, shutdown.clone());
///
/// let first = adapter.on_request().expect("capacity available");
/// let second = adapter.on_request().expect("capacity available");
/// let second_done = adapter.respond(second, "second");
/// let first_done = adapter.respond(first, "first");
/// drop(adapter);
///
/// let mut wire = Vec::new();
/// let written = outbound.write_all(&mut wire, shutdown).await.expect("vec sink never fails");
/// assert_eq!(written, 2);
/// assert_eq!(wire, ["first", "second"]);
/// assert!(first_done.await.is_ok());
/// assert!(second_done.await.is_ok());
/// # }
/// ```
pub struct PipelineAdapter<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for PipelineAdapter<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Send + 'static> PipelineAdapter<R> {
    /// Create an adapter and the queue feeding the connection's writer.
    ///
    /// `shutdown` is cancelled whenever the adapter decides the connection
    /// must close; the host should also cancel it when the peer goes away.
    #[must_use]
    pub fn new(config: SequencerConfig, shutdown: CancellationToken) -> (Self, OutboundQueue<R>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            sequencer: PipelineSequencer::new(config),
            // `Semaphore::new` panics above `MAX_PERMITS`.
            permits: Arc::new(Semaphore::new(
                config.max_outstanding().min(Semaphore::MAX_PERMITS),
            )),
            outbound: Mutex::new(tx),
            shutdown,
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            OutboundQueue::new(rx),
        )
    }

    /// Register a decoded request.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Overflow`] when `max_outstanding` requests
    /// are already read but not written, and [`SequencerError::Closed`] after
    /// [`PipelineAdapter::close`]. Either way the connection is closed as by
    /// [`PipelineAdapter::close`], failing every buffered response.
    pub fn on_request(&self) -> Result<RequestTicket, SequencerError> {
        let limit = self.shared.sequencer.max_outstanding();
        let permit = match Arc::clone(&self.shared.permits).try_acquire_owned() {
            Ok(permit) => permit,
            Err(tokio::sync::TryAcquireError::NoPermits) => {
                crate::metrics::inc_overflows();
                let error = SequencerError::Overflow { limit };
                self.abort(&error);
                return Err(error);
            }
            Err(tokio::sync::TryAcquireError::Closed) => {
                self.abort(&SequencerError::Closed);
                return Err(SequencerError::Closed);
            }
        };
        let handle = self
            .shared
            .sequencer
            .observe()
            .inspect_err(|e| self.abort(e))?;
        Ok(RequestTicket { handle, permit })
    }

    /// Hand in the response for `ticket`.
    ///
    /// Returns a future resolving once the response is written, or with the
    /// reason it never will be. A rejected submission closes the connection
    /// as [`PipelineAdapter::close`] does and resolves the future with
    /// [`CompletionError::ConnectionClosed`].
    pub fn respond(&self, ticket: RequestTicket, response: R) -> WriteCompletion {
        let (sink, completion) = completion_channel();
        let RequestTicket { handle, permit } = ticket;
        let outbound = self
            .shared
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match self
            .shared
            .sequencer
            .submit(handle, Queued { response, permit }, sink)
        {
            Ok(batch) => {
                for released in batch {
                    if let Err(mpsc::error::SendError(unsent)) = outbound.send(released) {
                        debug!(sequence = %unsent.sequence, "writer gone; failing released response");
                        unsent.sink.complete(Err(CompletionError::ConnectionClosed));
                    }
                }
            }
            Err(e) => {
                drop(outbound);
                self.abort(&e);
            }
        }
        completion
    }

    /// Drain the sequencer and cancel the connection.
    ///
    /// Buffered responses fail with [`CompletionError::ConnectionClosed`];
    /// responses already released are failed by the writer when it observes
    /// the cancellation. Safe to call more than once.
    pub fn close(&self) -> DrainSummary { self.shut_down() }

    /// Number of requests observed but not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize { self.shared.sequencer.outstanding() }

    /// Returns `true` once the connection has been cancelled.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.shared.shutdown.is_cancelled() }

    /// Tear the connection down after a fatal sequencer error. Must not be
    /// called with the outbound lock held.
    fn abort(&self, error: &SequencerError) {
        warn!(%error, "closing pipelined connection");
        let summary = self.shut_down();
        debug!(
            notified = summary.notified,
            abandoned = summary.abandoned,
            "failed buffered responses after fatal error"
        );
    }

    fn shut_down(&self) -> DrainSummary {
        let summary = self.shared.sequencer.drain_all();
        self.shared.permits.close();
        self.shared.shutdown.cancel();
        summary
    }
}

impl<R> std::fmt::Debug for PipelineAdapter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAdapter")
            .field("sequencer", &self.shared.sequencer)
            .field("closed", &self.shared.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}
