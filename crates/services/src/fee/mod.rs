// Path: crates/services/src/fee/mod.rs
//! A flat minimum-fee stage.

use crate::coin;
use fermion_api::state::ScopedState;
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Stage, TxResult};
use fermion_types::app::{Actor, Coin, Coins, FeeTx, Tx};
use fermion_types::config::FeeConfig;
use fermion_types::error::TransactionError;
use fermion_types::keys::{COIN_NAMESPACE, FEE_NAMESPACE};

/// Charges every transaction at least `min_fee`, paid to a collector account.
///
/// With a zero minimum the stage only unwraps fee envelopes that are
/// present, and transactions without one pass through untouched.
#[derive(Debug, Clone)]
pub struct SimpleFee {
    min_fee: Coin,
    collector: Vec<u8>,
}

impl SimpleFee {
    /// A stage charging `min_fee` into the `fee` account at `collector`.
    pub fn new(min_fee: Coin, collector: impl Into<Vec<u8>>) -> Self {
        Self {
            min_fee,
            collector: collector.into(),
        }
    }

    /// Builds the stage from the node's fee policy.
    pub fn from_config(config: &FeeConfig) -> Self {
        Self::new(
            Coin::new(config.denom.as_str(), config.min_amount),
            config.collector.as_bytes(),
        )
    }

    /// The account fees are paid to on `chain_id`.
    pub fn collector(&self, chain_id: &str) -> Actor {
        Actor::new(chain_id, FEE_NAMESPACE, self.collector.clone())
    }

    fn charge<'t>(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &'t Tx,
    ) -> Result<&'t Tx, TransactionError> {
        let Tx::Fee(FeeTx { fee, payer, inner }) = tx else {
            if self.min_fee.amount == 0 {
                return Ok(tx);
            }
            return Err(TransactionError::InsufficientFee(format!(
                "a fee of at least {} is required",
                self.min_fee
            )));
        };

        if fee.amount == 0 && self.min_fee.amount == 0 {
            return Ok(inner.as_ref());
        }
        if fee.denom != self.min_fee.denom || fee.amount < self.min_fee.amount {
            return Err(TransactionError::InsufficientFee(format!(
                "offered {fee}, need at least {}",
                self.min_fee
            )));
        }
        if !ctx.has_signer(payer) {
            return Err(TransactionError::Unauthorized(format!(
                "fee payer {payer} did not sign"
            )));
        }

        let collector = self.collector(&ctx.chain_id);
        let mut accounts = store.granted(COIN_NAMESPACE)?;
        coin::transfer(&mut accounts, payer, &collector, &Coins::from(fee.clone()))?;
        log::debug!("[Fee] {} paid {} to {}", payer, fee, collector);
        Ok(inner.as_ref())
    }
}

impl Stage for SimpleFee {
    fn name(&self) -> &'static str {
        FEE_NAMESPACE
    }

    fn granted_namespaces(&self) -> &[&'static str] {
        &[COIN_NAMESPACE]
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let inner = self.charge(ctx, store, tx)?;
        next.call(ctx, store, inner)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let inner = self.charge(ctx, store, tx)?;
        next.call(ctx, store, inner)
    }
}
