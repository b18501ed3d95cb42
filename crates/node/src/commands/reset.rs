// Path: crates/node/src/commands/reset.rs

use crate::home::Home;
use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Node home directory.
    #[clap(long, default_value = "./fermion-home")]
    pub home: PathBuf,
}

/// Deletes the persisted state. The next start reloads genesis.
pub fn run(args: ResetArgs) -> Result<()> {
    let home = Home::new(&args.home);
    let config = home.load_config()?;
    let path = home.state_path(&config);
    match fs::remove_file(&path) {
        Ok(()) => {
            tracing::warn!(target: "node", path = %path.display(), "persisted state deleted");
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(target: "node", path = %path.display(), "no persisted state");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
