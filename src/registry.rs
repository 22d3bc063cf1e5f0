//! Staging area for responses that completed out of order.
//!
//! Observed requests occupy one slot each, contiguous from the release
//! cursor upwards, so a slot is found by its offset from the cursor. Slots
//! start out pending and become ready once a response is submitted. The
//! release scan pops ready slots from the front until it meets a pending one.

use std::collections::VecDeque;

use crate::{error::InvalidStateReason, sequence::Sequence};

/// A response cleared for writing, paired with the sink awaiting its outcome.
#[derive(Debug)]
pub struct Released<R, S> {
    /// Sequence of the request this response answers.
    pub sequence: Sequence,
    /// The response to write.
    pub response: R,
    /// Sink to resolve once the write finishes.
    pub sink: S,
}

impl<R, S> Released<R, S> {
    /// Split into the response and its sink.
    pub fn into_parts(self) -> (R, S) { (self.response, self.sink) }
}

/// Responses released by a single submission, in wire order.
pub type ReleaseBatch<R, S> = Vec<Released<R, S>>;

/// State of a single observed request.
#[derive(Debug)]
pub(crate) enum Slot<R, S> {
    /// Observed, no response yet.
    Pending,
    /// Response submitted, waiting for its predecessors.
    Ready { response: R, sink: S },
}

/// Slots for every observed request that has not been released yet.
#[derive(Debug)]
pub(crate) struct CompletionRegistry<R, S> {
    release_cursor: Sequence,
    slots: VecDeque<Slot<R, S>>,
}

impl<R, S> Default for CompletionRegistry<R, S> {
    fn default() -> Self {
        Self {
            release_cursor: Sequence::ZERO,
            slots: VecDeque::new(),
        }
    }
}

impl<R, S> CompletionRegistry<R, S> {
    /// Sequence of the next entry allowed to be released.
    pub(crate) fn release_cursor(&self) -> Sequence { self.release_cursor }

    /// Number of buffered entries, pending and ready.
    pub(crate) fn len(&self) -> usize { self.slots.len() }

    /// Add a pending slot for the next observed request.
    pub(crate) fn push_pending(&mut self) { self.slots.push_back(Slot::Pending); }

    /// Check whether `sequence` can accept a response without mutating anything.
    ///
    /// `observed_until` is the first sequence not yet handed out.
    pub(crate) fn check_vacant(
        &self,
        sequence: Sequence,
        observed_until: Sequence,
    ) -> Result<usize, InvalidStateReason> {
        if self.release_cursor == Sequence::TERMINAL {
            return Err(InvalidStateReason::Drained);
        }
        if sequence < self.release_cursor {
            return Err(InvalidStateReason::AlreadyReleased);
        }
        if sequence >= observed_until {
            return Err(InvalidStateReason::Unobserved);
        }
        let offset = usize::try_from(sequence.as_u64() - self.release_cursor.as_u64())
            .map_err(|_| InvalidStateReason::Unobserved)?;
        match self.slots.get(offset) {
            Some(Slot::Pending) => Ok(offset),
            Some(Slot::Ready { .. }) => Err(InvalidStateReason::AlreadySubmitted),
            None => Err(InvalidStateReason::Unobserved),
        }
    }

    /// Mark the slot at `offset` ready. `offset` must come from
    /// [`CompletionRegistry::check_vacant`].
    pub(crate) fn fill(&mut self, offset: usize, response: R, sink: S) {
        if let Some(slot) = self.slots.get_mut(offset) {
            *slot = Slot::Ready { response, sink };
        }
    }

    /// Pop the contiguous run of ready slots at the front, advancing the
    /// cursor past each one.
    pub(crate) fn release_ready(&mut self) -> ReleaseBatch<R, S> {
        let mut batch = Vec::new();
        while matches!(self.slots.front(), Some(Slot::Ready { .. })) {
            let Some(Slot::Ready { response, sink }) = self.slots.pop_front() else {
                break;
            };
            batch.push(Released {
                sequence: self.release_cursor,
                response,
                sink,
            });
            self.release_cursor = self.release_cursor.next();
        }
        batch
    }

    /// Remove every slot and park the cursor at its terminal value.
    pub(crate) fn drain(&mut self) -> Vec<(Sequence, Slot<R, S>)> {
        let base = self.release_cursor;
        self.release_cursor = Sequence::TERMINAL;
        self.slots
            .drain(..)
            .zip(base.as_u64()..)
            .map(|(slot, seq)| (Sequence::new(seq), slot))
            .collect()
    }
}
