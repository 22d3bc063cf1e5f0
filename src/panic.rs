//! Utilities for working with panic payloads.
//!
//! Completion sinks are caller code; when one panics during a drain the
//! payload is caught and rendered with these helpers before being logged.

use std::{any::Any, fmt};

/// Wrapper that formats a panic payload when logged or displayed.
///
/// The payload is downcast to `String` or `&'static str` if possible and falls
/// back to `Debug` formatting otherwise.
///
/// ```
/// use pipeline_sequencer::panic::format_panic;
/// assert_eq!(format_panic(&"boom").to_string(), "boom");
/// assert_eq!(format_panic(&String::from("boom")).to_string(), "boom");
/// assert!(format_panic(&5_u32).to_string().contains("Any"));
/// ```
#[derive(Debug)]
#[must_use]
pub struct PanicMessage<'a>(&'a (dyn Any + Send));

impl fmt::Display for PanicMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<&'static str>() {
            f.write_str(s)
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

/// Create a [`PanicMessage`] borrowing the given payload.
pub fn format_panic(panic: &(dyn Any + Send)) -> PanicMessage<'_> { PanicMessage(panic) }

/// Run `f`, catching any panic and returning its rendered message.
pub(crate) fn catch_sink_panic<F: FnOnce()>(f: F) -> Result<(), String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .map_err(|payload| format_panic(&*payload).to_string())
}
