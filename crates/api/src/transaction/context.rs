// Path: crates/api/src/transaction/context.rs
//! Defines the per-transaction execution context.

use fermion_types::app::Actor;

/// Read-only context handed to every stage and handler.
///
/// The context is never mutated in place. A stage that establishes new
/// permissions (a verified signature, an assumed role, an IBC origin) builds an
/// extended copy with [`TxContext::with_signers`] and passes that copy down,
/// so the caller's context is unchanged once the call returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxContext {
    /// The chain this node runs.
    pub chain_id: String,
    /// The height of the block being processed.
    pub block_height: u64,
    signers: Vec<Actor>,
}

impl TxContext {
    /// A context with no permissions.
    pub fn new(chain_id: impl Into<String>, block_height: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            block_height,
            signers: Vec::new(),
        }
    }

    /// Returns a copy that additionally holds `actors`. Duplicates are ignored.
    #[must_use]
    pub fn with_signers(&self, actors: impl IntoIterator<Item = Actor>) -> Self {
        let mut extended = self.clone();
        for actor in actors {
            if !extended.signers.contains(&actor) {
                extended.signers.push(actor);
            }
        }
        extended
    }

    /// True if the context holds the permission of `actor`.
    pub fn has_signer(&self, actor: &Actor) -> bool {
        self.signers.contains(actor)
    }

    /// All permissions, in the order they were granted.
    pub fn signers(&self) -> &[Actor] {
        &self.signers
    }
}
