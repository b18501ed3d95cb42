// Path: crates/node/src/main.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Fermion Node
//!
//! Initializes a node home, replays blocks of transactions through the
//! application and persists the committed state between runs.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod home;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "fermion",
    version,
    about = "The Fermion node.",
    long_about = "Runs the Fermion transaction pipeline and validator-set reconciliation over blocks read from a file."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a fresh config.toml and genesis.json into a home directory.
    Init(init::InitArgs),

    /// Replay blocks from a JSON file on top of the persisted state.
    Start(start::StartArgs),

    /// Delete the persisted state, keeping config and genesis.
    UnsafeResetAll(reset::ResetArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    fermion_telemetry::init::init_tracing("info")?;

    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Start(args) => start::run(args),
        Commands::UnsafeResetAll(args) => reset::run(args),
    }
}
