//! Completion sinks that record how they were resolved.

use std::sync::{Arc, Mutex, PoisonError};

use pipeline_sequencer::{CompletionSink, WriteOutcome};

/// Shared log of sink outcomes, tagged with the label given to each sink.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    outcomes: Arc<Mutex<Vec<(String, WriteOutcome)>>>,
}

impl Recorder {
    /// Create an unlabelled sink reporting into this recorder.
    #[must_use]
    pub fn sink(&self) -> RecordingSink { self.labelled("") }

    /// Create a sink whose outcome is recorded under `label`.
    #[must_use]
    pub fn labelled(&self, label: impl Into<String>) -> RecordingSink {
        RecordingSink {
            label: label.into(),
            outcomes: Arc::clone(&self.outcomes),
            panics: false,
        }
    }

    /// Create a sink that panics instead of recording, for exercising drain
    /// isolation.
    #[must_use]
    pub fn panicking(&self) -> RecordingSink {
        RecordingSink {
            panics: true,
            ..self.labelled("panicking")
        }
    }

    /// Snapshot of every outcome recorded so far, in resolution order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<(String, WriteOutcome)> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of sinks resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no sink has been resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Sink created by a [`Recorder`].
#[derive(Debug)]
pub struct RecordingSink {
    label: String,
    outcomes: Arc<Mutex<Vec<(String, WriteOutcome)>>>,
    panics: bool,
}

impl CompletionSink for RecordingSink {
    fn complete(self, outcome: WriteOutcome) {
        assert!(!self.panics, "completion sink panicked on purpose");
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((self.label, outcome));
    }
}
