//! Deterministic ed25519 keys and transaction envelope builders.

use crate::randomness::TestRng;
use ed25519_dalek::{Signer, SigningKey};
use fermion_types::app::{account_address, Actor, CoinMsg, Coins, Message, PubKey, Signature, SignedTx, Tx};
use fermion_types::keys::SIGS_NAMESPACE;

/// A signing key with helpers for the identities derived from it.
pub struct TestKey {
    signing_key: SigningKey,
}

impl TestKey {
    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// The key whose seed is 32 copies of `n`. Equal `n` gives equal keys.
    pub fn numbered(n: u8) -> Self {
        Self::from_seed([n; 32])
    }

    /// A key drawn from a deterministic RNG.
    pub fn random(rng: &mut TestRng) -> Self {
        Self::from_seed(rng.seed32())
    }

    /// The public key.
    pub fn pub_key(&self) -> PubKey {
        PubKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The account address of the key.
    pub fn address(&self) -> Vec<u8> {
        account_address(&self.pub_key())
    }

    /// The `sigs` actor the signature stage grants for this key on `chain_id`.
    pub fn actor(&self, chain_id: &str) -> Actor {
        Actor::new(chain_id, SIGS_NAMESPACE, self.address())
    }

    /// Signs the sign bytes of `tx`.
    pub fn sign(&self, tx: &Tx) -> Signature {
        Signature {
            pub_key: self.pub_key(),
            signature: self.signing_key.sign(&tx.sign_bytes()).to_bytes().to_vec(),
        }
    }
}

/// Wraps `inner` in a signature envelope signed by every key.
pub fn sign_tx(inner: Tx, keys: &[&TestKey]) -> Tx {
    let signatures = keys.iter().map(|k| k.sign(&inner)).collect();
    Tx::Signed(SignedTx {
        signatures,
        inner: Box::new(inner),
    })
}

/// Builds the full client envelope around `inner`:
/// `Signed(Chain(Nonce(inner)))` with every key in the nonce signer set.
pub fn envelope(chain_id: &str, sequence: u64, keys: &[&TestKey], inner: Tx) -> Tx {
    let signers = keys.iter().map(|k| k.actor(chain_id)).collect();
    let bound = inner.with_nonce(sequence, signers).with_chain(chain_id, 0);
    sign_tx(bound, keys)
}

/// A coin transfer message.
pub fn send_msg(from: &Actor, to: &Actor, coins: Coins) -> Tx {
    Tx::msg(Message::Coin(CoinMsg::Send {
        from: from.clone(),
        to: to.clone(),
        coins,
    }))
}
