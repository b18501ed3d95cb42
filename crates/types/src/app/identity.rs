// Path: crates/types/src/app/identity.rs

//! Defines the permission principal (`Actor`), validator public keys, and the
//! single deterministic function used to derive an account address from a key.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// An ed25519 public key, used both for transaction signers and validators.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Default,
    Hash,
)]
pub struct PubKey(pub [u8; 32]);

impl PubKey {
    /// Parses a hex-encoded 32-byte key.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| "public key must be 32 bytes".to_string())?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for PubKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A principal that can hold permissions inside a transaction context.
///
/// `app` names the module that vouches for the actor (e.g. `sigs` for a
/// verified signature, `role` for an assumed role), and `chain_id` names the
/// chain it originates from. Two actors are the same principal only if all
/// three fields match.
#[derive(
    Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash,
)]
pub struct Actor {
    /// The chain the actor belongs to. Empty means "the local chain".
    pub chain_id: String,
    /// The module that authenticated the actor.
    pub app: String,
    /// The address within that module.
    pub address: Vec<u8>,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(chain_id: impl Into<String>, app: impl Into<String>, address: Vec<u8>) -> Self {
        Self {
            chain_id: chain_id.into(),
            app: app.into(),
            address,
        }
    }

    /// Returns a copy of this actor bound to `chain_id`.
    pub fn with_chain(&self, chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.chain_id, self.app, hex::encode(&self.address))
    }
}

/// Derives the canonical account address for a public key.
pub fn account_address(pub_key: &PubKey) -> Vec<u8> {
    let mut hasher = Sha256::new();
    // Domain separate the hash to prevent collisions with other parts of the system.
    hasher.update(b"FERMION-ACCOUNT::V1");
    hasher.update(pub_key.0);
    hasher.finalize().to_vec()
}
