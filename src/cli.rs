//! Command line interface for the `pipeline-sequencer` demo binary.
//!
//! Provides a tiny CLI to drive a simulated pipelined connection and to
//! generate the man page.

use clap::Parser;

/// Command line arguments for the `pipeline-sequencer` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pipeline-sequencer",
    version,
    about = "Simulate a pipelined connection whose handlers finish out of order"
)]
pub struct Cli {
    /// Number of pipelined requests to send.
    #[arg(short, long, default_value_t = 16)]
    pub requests: u32,
    /// Maximum requests read but not yet written.
    #[arg(short, long, default_value_t = 8)]
    pub max_outstanding: usize,
    /// Permutation stride applied to handler delays.
    #[arg(short, long, default_value_t = 5)]
    pub stride: u32,
}
