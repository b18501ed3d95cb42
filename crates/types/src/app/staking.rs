// Path: crates/types/src/app/staking.rs

//! Validator candidates, the active validator set, and the updates reported to consensus.

use crate::app::{Actor, PubKey};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a validator candidate.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CandidateStatus {
    /// Eligible for the validator set.
    Bonded,
    /// All shares released; the record is removed at the next tick.
    Unbonding,
    /// Removed from eligibility; keeps its shares but has no voting power.
    Revoked,
}

/// An account seeking inclusion in the validator set.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Candidate {
    /// The validator key.
    pub pub_key: PubKey,
    /// The actor that declared the candidacy.
    pub owner: Actor,
    /// Total bonded shares, one share per bonded coin.
    pub shares: u64,
    /// The voting power persisted by the last tick.
    pub voting_power: u64,
    /// Lifecycle status.
    pub status: CandidateStatus,
}

impl Candidate {
    /// A freshly declared candidate. Voting power is assigned at the next tick.
    pub fn new(pub_key: PubKey, owner: Actor, shares: u64) -> Self {
        Self {
            pub_key,
            owner,
            shares,
            voting_power: 0,
            status: CandidateStatus::Bonded,
        }
    }
}

/// A delegator's shares in one candidate.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct DelegatorBond {
    /// The candidate the shares belong to.
    pub pub_key: PubKey,
    /// The bonded shares.
    pub shares: u64,
}

/// A member of the active validator set.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Validator {
    /// The validator key.
    pub pub_key: PubKey,
    /// The voting power.
    pub power: u64,
}

/// A change to the validator set reported to consensus. Power 0 means removal.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ValidatorUpdate {
    /// The validator key.
    pub pub_key: PubKey,
    /// The new voting power.
    pub power: u64,
}

impl From<&Validator> for ValidatorUpdate {
    fn from(v: &Validator) -> Self {
        Self {
            pub_key: v.pub_key,
            power: v.power,
        }
    }
}

/// Staking parameters set at genesis.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct StakeParams {
    /// The maximum size of the validator set.
    pub max_vals: u32,
    /// The only denomination accepted for bonding.
    pub allowed_bond_denom: String,
}

impl Default for StakeParams {
    fn default() -> Self {
        Self {
            max_vals: 100,
            allowed_bond_denom: "fermion".to_string(),
        }
    }
}
