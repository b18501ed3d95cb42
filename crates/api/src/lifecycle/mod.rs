// Path: crates/api/src/lifecycle/mod.rs
//! Defines traits for components that hook into the block processing lifecycle.

use crate::state::StateAccess;
use crate::transaction::context::TxContext;
use fermion_types::app::ValidatorUpdate;
use fermion_types::error::TickError;

/// Recomputes the validator set once per block.
///
/// Called after all transactions in a block have been delivered, whether or
/// not the block contained any. The returned updates are handed to consensus;
/// an error means the node cannot produce a trustworthy validator set.
pub trait Ticker: Send + Sync {
    /// Reconciles voting power and returns the validator delta.
    fn tick(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
    ) -> Result<Vec<ValidatorUpdate>, TickError>;
}
