//! Sequencer configuration.
//!
//! The outstanding-entry limit is the only tunable. There is no default:
//! callers pick it from their per-connection memory budget.

use std::num::NonZeroUsize;

use crate::error::ConfigError;

/// Settings for a [`crate::PipelineSequencer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencerConfig {
    max_outstanding: NonZeroUsize,
}

impl SequencerConfig {
    /// Create a configuration allowing at most `max_outstanding` requests to
    /// be read but not yet written on a connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `max_outstanding` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipeline_sequencer::{ConfigError, SequencerConfig};
    ///
    /// let config = SequencerConfig::new(16).expect("non-zero limit");
    /// assert_eq!(config.max_outstanding(), 16);
    /// assert_eq!(SequencerConfig::new(0), Err(ConfigError::ZeroCapacity));
    /// ```
    pub fn new(max_outstanding: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(max_outstanding)
            .map(Self::with_limit)
            .ok_or(ConfigError::ZeroCapacity)
    }

    /// Create a configuration from an already validated limit.
    #[must_use]
    pub const fn with_limit(max_outstanding: NonZeroUsize) -> Self { Self { max_outstanding } }

    /// Maximum number of outstanding entries.
    #[must_use]
    pub const fn max_outstanding(&self) -> usize { self.max_outstanding.get() }
}
