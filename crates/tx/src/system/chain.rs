// Path: crates/tx/src/system/chain.rs

//! Binds a transaction to one chain and an optional expiry height.

use fermion_api::state::ScopedState;
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Stage, TxResult};
use fermion_types::app::Tx;
use fermion_types::error::TransactionError;
use fermion_types::keys::CHAIN_NAMESPACE;

/// Consumes the `Chain` envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChainCheck;

impl ChainCheck {
    fn unwrap_envelope<'t>(ctx: &TxContext, tx: &'t Tx) -> Result<&'t Tx, TransactionError> {
        let Tx::Chain(chain) = tx else {
            return Err(TransactionError::MissingChain);
        };
        if chain.chain_id != ctx.chain_id {
            return Err(TransactionError::WrongChain {
                expected: ctx.chain_id.clone(),
                got: chain.chain_id.clone(),
            });
        }
        // Zero means the transaction never expires.
        if chain.expires_at != 0 && chain.expires_at < ctx.block_height {
            return Err(TransactionError::Expired {
                height: ctx.block_height,
                expires_at: chain.expires_at,
            });
        }
        Ok(chain.inner.as_ref())
    }
}

impl Stage for ChainCheck {
    fn name(&self) -> &'static str {
        CHAIN_NAMESPACE
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let inner = Self::unwrap_envelope(ctx, tx)?;
        next.call(ctx, store, inner)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let inner = Self::unwrap_envelope(ctx, tx)?;
        next.call(ctx, store, inner)
    }
}
