//! Sequence tags and request handles.
//!
//! Every request boundary observed on a connection receives a [`Sequence`]
//! from a [`SequenceCounter`]. The tag travels with the [`RequestHandle`]
//! through the handler and back to the sequencer, which uses it to place the
//! response in arrival order.

use std::fmt;

/// Position of a request in the arrival order of its connection.
///
/// Tags start at zero and increase by one per observed request. They are
/// never reused within a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence(u64);

impl Sequence {
    /// The first tag handed out on a connection.
    pub const ZERO: Sequence = Sequence(0);

    /// Cursor value of a drained sequencer. No handle ever carries it.
    pub(crate) const TERMINAL: Sequence = Sequence(u64::MAX);

    /// Create a [`Sequence`] from its raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Return the raw `u64` value.
    #[must_use]
    pub const fn as_u64(self) -> u64 { self.0 }

    /// Return the tag following this one, saturating at [`Sequence::TERMINAL`].
    #[must_use]
    pub(crate) const fn next(self) -> Self { Self(self.0.saturating_add(1)) }
}

impl Default for Sequence {
    fn default() -> Self { Self::ZERO }
}

impl From<u64> for Sequence {
    fn from(value: u64) -> Self { Self(value) }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// Opaque token returned when a request boundary is observed.
///
/// The handle is passed to whichever task computes the response and handed
/// back to [`crate::PipelineSequencer::submit`] together with that response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestHandle {
    sequence: Sequence,
}

impl RequestHandle {
    pub(crate) const fn new(sequence: Sequence) -> Self { Self { sequence } }

    /// Sequence tag assigned to the request.
    #[must_use]
    pub const fn sequence(&self) -> Sequence { self.sequence }
}

/// Monotonic source of [`Sequence`] tags for a single connection.
#[derive(Debug, Default)]
pub(crate) struct SequenceCounter {
    next: Sequence,
}

impl SequenceCounter {
    /// Tag that the next call to [`SequenceCounter::issue`] will return.
    pub(crate) fn peek(&self) -> Sequence { self.next }

    /// Counter whose next tag is `next`.
    #[cfg(test)]
    pub(crate) const fn starting_at(next: Sequence) -> Self { Self { next } }

    /// Hand out the current tag and advance the counter.
    ///
    /// Returns `None` once the tag space is exhausted; the terminal value is
    /// never handed out.
    pub(crate) fn issue(&mut self) -> Option<RequestHandle> {
        if self.next == Sequence::TERMINAL {
            return None;
        }
        let handle = RequestHandle::new(self.next);
        self.next = self.next.next();
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn counter_starts_at_zero() {
        let mut counter = SequenceCounter::default();
        assert_eq!(counter.issue().as_ref().map(RequestHandle::sequence), Some(Sequence::ZERO));
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(64)]
    fn counter_issues_contiguous_tags(#[case] count: u64) {
        let mut counter = SequenceCounter::default();
        let issued: Vec<u64> = (0..count)
            .map(|_| counter.issue().expect("tag space").sequence().as_u64())
            .collect();
        assert_eq!(issued, (0..count).collect::<Vec<_>>());
        assert_eq!(counter.peek(), Sequence::new(count));
    }

    #[test]
    fn counter_never_issues_the_terminal_tag() {
        let mut counter = SequenceCounter::starting_at(Sequence::new(u64::MAX - 1));
        let last = counter.issue().expect("last tag");
        assert_eq!(last.sequence(), Sequence::new(u64::MAX - 1));
        assert_eq!(counter.peek(), Sequence::TERMINAL);
        assert!(counter.issue().is_none());
        assert!(counter.issue().is_none(), "exhaustion is sticky");
    }

    #[test]
    fn sequence_display_is_tagged() {
        assert_eq!(Sequence::new(7).to_string(), "#7");
    }
}
