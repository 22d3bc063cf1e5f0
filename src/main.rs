//! Demo binary for `pipeline_sequencer`.
//!
//! Simulates a pipelined connection: requests are decoded back to back,
//! handlers finish after permuted delays, and the responses are printed in
//! the order they reach the wire.

mod cli;

use std::{collections::VecDeque, time::Duration};

use clap::Parser;
use futures::{StreamExt, channel::mpsc};
use pipeline_sequencer::{PipelineAdapter, SequencerConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let config = SequencerConfig::new(cli.max_outstanding)?;
    let shutdown = CancellationToken::new();
    let (adapter, outbound) = PipelineAdapter::<u32>::new(config, shutdown.clone());
    let (wire_tx, wire_rx) = mpsc::unbounded();
    let writer = tokio::spawn(outbound.write_all(wire_tx, shutdown));

    // Keep the pipeline depth within the limit, as a well-behaved peer would.
    let mut window = VecDeque::new();
    for tag in 0..cli.requests {
        if window.len() == config.max_outstanding()
            && let Some(oldest) = window.pop_front()
        {
            oldest.await??;
        }
        let ticket = adapter.on_request()?;
        let delay = Duration::from_millis(u64::from(tag.wrapping_mul(cli.stride) % cli.requests));
        let handler = adapter.clone();
        window.push_back(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handler.respond(ticket, tag).await
        }));
    }
    for pending in window {
        pending.await??;
    }
    drop(adapter);

    let written = writer.await??;
    let wire: Vec<u32> = wire_rx.collect().await;
    println!("wrote {written} responses in order: {wire:?}");
    Ok(())
}
