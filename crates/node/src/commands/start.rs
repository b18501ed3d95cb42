// Path: crates/node/src/commands/start.rs

use crate::home::Home;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fermion_execution::App;
use fermion_state::snapshot::{load_snapshot, save_snapshot, Snapshot};
use fermion_telemetry::sinks::install_sink;
use fermion_types::app::Tx;
use fermion_types::config::NodeConfig;
use fermion_types::error::ErrorCode;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
pub struct StartArgs {
    /// Node home directory.
    #[clap(long, default_value = "./fermion-home")]
    pub home: PathBuf,
    /// JSON file holding a list of blocks, each a list of transactions.
    #[clap(long)]
    pub blocks: PathBuf,
    /// Print Prometheus metrics to stdout after the last block.
    #[clap(long)]
    pub metrics: bool,
}

/// What one replayed block produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub height: u64,
    pub accepted: usize,
    pub rejected: usize,
    pub validator_updates: usize,
    pub root_hash: [u8; 32],
}

pub fn run(args: StartArgs) -> Result<()> {
    if args.metrics {
        let sink = fermion_telemetry::prometheus::install()?;
        install_sink(sink);
    }
    let summaries = replay(&Home::new(&args.home), &args.blocks)?;
    if let Some(last) = summaries.last() {
        println!(
            "Committed height {} with root {}",
            last.height,
            hex::encode(last.root_hash)
        );
    }
    if args.metrics {
        print!("{}", fermion_telemetry::prometheus::render_text()?);
    }
    Ok(())
}

/// Replays every block in `blocks` and persists the state after each commit.
pub fn replay(home: &Home, blocks: &Path) -> Result<Vec<BlockSummary>> {
    let config = home.load_config()?;
    let mut app = open(home, &config)?;
    let raw = fs::read_to_string(blocks)
        .with_context(|| format!("reading {}", blocks.display()))?;
    let blocks: Vec<Vec<Tx>> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", blocks.display()))?;

    let state_path = home.state_path(&config);
    let mut summaries = Vec::with_capacity(blocks.len());
    for txs in &blocks {
        let summary = run_block(&mut app, txs)?;
        save_snapshot(&state_path, &Snapshot::capture(app.height(), app.state()))?;
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Resumes from the persisted snapshot, or loads genesis on a fresh home.
fn open(home: &Home, config: &NodeConfig) -> Result<App> {
    let app = App::new(config)?;
    match load_snapshot(&home.state_path(config))? {
        Some(snapshot) => {
            let height = snapshot.height;
            let app = app.restored(height, snapshot.restore()?);
            tracing::info!(
                target: "node",
                height,
                root = %hex::encode(app.root_hash()),
                "resumed from snapshot"
            );
            Ok(app)
        }
        None => {
            let genesis = home.load_genesis(config)?;
            let mut app = app;
            app.init_chain(&genesis)?;
            Ok(app)
        }
    }
}

fn run_block(app: &mut App, txs: &[Tx]) -> Result<BlockSummary> {
    let height = app.height() + 1;
    app.begin_block(height)?;

    let (mut accepted, mut rejected) = (0, 0);
    for (index, tx) in txs.iter().enumerate() {
        match app.deliver_tx(tx) {
            Ok(_) => accepted += 1,
            Err(e) => {
                rejected += 1;
                tracing::warn!(
                    target: "node",
                    height,
                    index,
                    code = e.code(),
                    error = %e,
                    "transaction rejected"
                );
            }
        }
    }

    let updates = app.end_block()?;
    for update in &updates {
        tracing::info!(
            target: "node",
            height,
            pub_key = %update.pub_key,
            power = update.power,
            "validator update"
        );
    }
    let root_hash = app.commit()?;
    if app.height() != height {
        return Err(anyhow!("commit left the chain at height {}", app.height()));
    }
    Ok(BlockSummary {
        height,
        accepted,
        rejected,
        validator_updates: updates.len(),
        root_hash,
    })
}
