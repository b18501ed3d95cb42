// Path: crates/types/src/config/mod.rs

//! Node configuration (`config.toml`) and the genesis document (`genesis.json`).
use crate::error::GenesisError;
use serde::{Deserialize, Serialize};

/// Top-level node configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// The chain this node runs.
    pub chain_id: String,
    /// Snapshot file, relative to the node home.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Genesis file, relative to the node home.
    #[serde(default = "default_genesis_file")]
    pub genesis_file: String,
    /// Fee policy.
    #[serde(default)]
    pub fee: FeeConfig,
    /// Staking limits used when genesis does not override them.
    #[serde(default)]
    pub stake: StakeConfig,
}

fn default_state_file() -> String {
    "state.scale".to_string()
}
fn default_genesis_file() -> String {
    "genesis.json".to_string()
}

impl NodeConfig {
    /// A configuration with every optional field at its default.
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            state_file: default_state_file(),
            genesis_file: default_genesis_file(),
            fee: FeeConfig::default(),
            stake: StakeConfig::default(),
        }
    }
}

/// The minimum fee charged per transaction and where it goes.
///
/// The default charges nothing. The denomination is a placeholder until an
/// operator configures a real fee policy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FeeConfig {
    /// The fee denomination.
    #[serde(default = "default_fee_denom")]
    pub denom: String,
    /// The minimum amount. Zero disables fee enforcement.
    #[serde(default)]
    pub min_amount: u64,
    /// Address of the collector account under the `fee` app.
    #[serde(default = "default_fee_collector")]
    pub collector: String,
}

fn default_fee_denom() -> String {
    "strings".to_string()
}
fn default_fee_collector() -> String {
    "bank".to_string()
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            denom: default_fee_denom(),
            min_amount: 0,
            collector: default_fee_collector(),
        }
    }
}

/// Staking defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StakeConfig {
    /// The maximum validator set size.
    #[serde(default = "default_max_vals")]
    pub max_vals: u32,
    /// The denomination accepted for bonding.
    #[serde(default = "default_bond_denom")]
    pub allowed_bond_denom: String,
}

fn default_max_vals() -> u32 {
    100
}
fn default_bond_denom() -> String {
    "fermion".to_string()
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            max_vals: default_max_vals(),
            allowed_bond_denom: default_bond_denom(),
        }
    }
}

/// The genesis document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct GenesisDoc {
    /// The chain id.
    pub chain_id: String,
    /// Module options, each of the form `module/key/value`.
    #[serde(default)]
    pub options: Vec<String>,
}

impl GenesisDoc {
    /// Parses every option, failing on the first malformed one.
    pub fn parsed_options(&self) -> Result<Vec<GenesisOption>, GenesisError> {
        self.options.iter().map(|o| GenesisOption::parse(o)).collect()
    }
}

/// One parsed `module/key/value` genesis option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisOption {
    /// The module the option is for.
    pub module: String,
    /// The option key inside the module.
    pub key: String,
    /// The raw value. May itself contain `/`.
    pub value: String,
}

impl GenesisOption {
    /// Parses `module/key/value`. Only the first two `/` separate fields.
    pub fn parse(raw: &str) -> Result<Self, GenesisError> {
        let mut parts = raw.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(module), Some(key), Some(value)) if !module.is_empty() && !key.is_empty() => {
                Ok(Self {
                    module: module.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            _ => Err(GenesisError::Malformed(raw.to_string())),
        }
    }
}
