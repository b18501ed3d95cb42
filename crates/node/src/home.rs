// Path: crates/node/src/home.rs

//! Layout of a node home directory.

use anyhow::{anyhow, Context, Result};
use fermion_types::config::{GenesisDoc, NodeConfig};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

/// A node home: `config.toml` plus the genesis and state files it names.
#[derive(Debug, Clone)]
pub struct Home {
    root: PathBuf,
}

impl Home {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn genesis_path(&self, config: &NodeConfig) -> PathBuf {
        self.root.join(&config.genesis_file)
    }

    pub fn state_path(&self, config: &NodeConfig) -> PathBuf {
        self.root.join(&config.state_file)
    }

    pub fn load_config(&self) -> Result<NodeConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Err(anyhow!(
                "no {} in {}; run `fermion init` first",
                CONFIG_FILE,
                self.root.display()
            ));
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn load_genesis(&self, config: &NodeConfig) -> Result<GenesisDoc> {
        let path = self.genesis_path(config);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}
