// Path: crates/node/src/commands/init.rs

use crate::home::Home;
use anyhow::{anyhow, Result};
use clap::Parser;
use fermion_types::config::{GenesisDoc, GenesisOption, NodeConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Node home directory.
    #[clap(long, default_value = "./fermion-home")]
    pub home: PathBuf,
    /// Chain ID for the new chain.
    #[clap(long)]
    pub chain_id: String,
    /// Genesis option of the form `module/key/value`. May be repeated.
    #[clap(long = "option")]
    pub options: Vec<String>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let home = Home::new(&args.home);
    if home.config_path().exists() {
        return Err(anyhow!(
            "{} is already initialized",
            home.root().display()
        ));
    }
    // Reject malformed options now rather than at the first start.
    for option in &args.options {
        GenesisOption::parse(option)?;
    }

    fs::create_dir_all(home.root())?;
    let config = NodeConfig::new(args.chain_id.as_str());
    fs::write(home.config_path(), toml::to_string_pretty(&config)?)?;

    let genesis = GenesisDoc {
        chain_id: args.chain_id,
        options: args.options,
    };
    fs::write(
        home.genesis_path(&config),
        serde_json::to_string_pretty(&genesis)?,
    )?;

    tracing::info!(
        target: "node",
        home = %home.root().display(),
        chain_id = %config.chain_id,
        options = genesis.options.len(),
        "node home initialized"
    );
    println!("Initialized {} for chain '{}'", home.root().display(), config.chain_id);
    Ok(())
}
