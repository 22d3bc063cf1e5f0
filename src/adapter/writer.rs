//! Write loop draining released responses into the connection's sink.

use std::fmt::Display;

use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::Outbound;
use crate::{error::CompletionError, sink::CompletionSink};

/// Receiving end of the responses released by a [`super::PipelineAdapter`].
///
/// Responses arrive already in request order.
#[derive(Debug)]
pub struct OutboundQueue<R> {
    rx: mpsc::UnboundedReceiver<Outbound<R>>,
}

impl<R> OutboundQueue<R> {
    pub(super) fn new(rx: mpsc::UnboundedReceiver<Outbound<R>>) -> Self { Self { rx } }

    /// Write released responses to `writer` until every adapter clone is
    /// dropped or `shutdown` is cancelled, returning how many were written.
    ///
    /// Each response's completion resolves `Ok(())` once `writer` accepts
    /// and flushes it. On cancellation, responses released but not yet
    /// written are failed with [`CompletionError::ConnectionClosed`].
    ///
    /// # Errors
    ///
    /// Returns the writer's error after failing the response being written
    /// and every response still queued, and cancelling `shutdown`.
    pub async fn write_all<W>(mut self, mut writer: W, shutdown: CancellationToken) -> Result<usize, W::Error>
    where
        W: Sink<R> + Unpin,
        W::Error: Display,
    {
        let mut written = 0;
        loop {
            let next = tokio::select! {
                biased;
                () = shutdown.cancelled() => None,
                next = self.rx.recv() => next,
            };
            let Some(outbound) = next else { break };
            let sequence = outbound.sequence;
            let (queued, sink) = outbound.into_parts();
            match writer.send(queued.response).await {
                Ok(()) => {
                    written += 1;
                    drop(queued.permit);
                    sink.complete(Ok(()));
                }
                Err(e) => {
                    warn!(%sequence, error = %e, "failed to write pipelined response");
                    sink.complete(Err(CompletionError::Write(e.to_string())));
                    shutdown.cancel();
                    self.fail_queued();
                    return Err(e);
                }
            }
        }
        let failed = self.fail_queued();
        debug!(written, failed, "pipelined writer finished");
        Ok(written)
    }

    /// Close the queue and fail everything still in it.
    fn fail_queued(&mut self) -> usize {
        self.rx.close();
        let mut failed = 0;
        while let Ok(outbound) = self.rx.try_recv() {
            outbound.sink.complete(Err(CompletionError::ConnectionClosed));
            failed += 1;
        }
        failed
    }
}
