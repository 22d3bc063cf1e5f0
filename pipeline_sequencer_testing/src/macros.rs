//! Assertion macros shared by integration tests.

/// Observe a request and panic with contextual diagnostics on failure.
#[macro_export]
macro_rules! observe_expect {
    ($sequencer:expr) => {{
        $sequencer
            .observe()
            .expect(concat!("observe failed at ", file!(), ":", line!()))
    }};
}

/// Submit a response and panic with contextual diagnostics on failure.
#[macro_export]
macro_rules! submit_expect {
    ($sequencer:expr, $handle:expr, $response:expr, $sink:expr) => {{
        $sequencer
            .submit($handle, $response, $sink)
            .expect(concat!("submit failed at ", file!(), ":", line!()))
    }};
}

pub use crate::{observe_expect, submit_expect};
