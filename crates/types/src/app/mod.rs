// Path: crates/types/src/app/mod.rs
//! Application-level data structures.

mod coin;
mod identity;
mod staking;
mod transaction;

pub use coin::{Coin, Coins};
pub use identity::{account_address, Actor, PubKey};
pub use staking::{
    Candidate, CandidateStatus, DelegatorBond, StakeParams, Validator, ValidatorUpdate,
};
pub use transaction::{
    AssumeRoleTx, ChainTx, CoinMsg, FeeTx, IbcMsg, IbcPacketTx, Message, MessageKind, NonceTx,
    Packet, RolesMsg, Signature, SignedTx, StakeMsg, Tx,
};

/// A multi-signature role stored by the roles module.
#[derive(
    parity_scale_codec::Encode,
    parity_scale_codec::Decode,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    PartialEq,
    Eq,
    Debug,
)]
pub struct Role {
    /// How many members must sign to assume the role.
    pub min_sigs: u32,
    /// The role members.
    pub signers: Vec<Actor>,
}
