// Path: crates/tx/src/system/checkpoint.rs

//! A rollback point in the pipeline.

use fermion_api::state::{ScopedState, StateOverlay, StateScope};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Phase, Stage, TxResult};
use fermion_types::app::Tx;
use fermion_types::error::TransactionError;

/// Runs the inner pipeline against a write overlay in the selected phases.
///
/// If the inner pipeline succeeds the overlay's writes are applied to the
/// store in one batch. If it fails the overlay is dropped, so every write made
/// below the checkpoint is discarded. Writes made by stages above the
/// checkpoint are unaffected either way.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    on_check: bool,
    on_deliver: bool,
}

impl Checkpoint {
    /// A checkpoint active in the given phases.
    pub fn new(on_check: bool, on_deliver: bool) -> Self {
        Self {
            on_check,
            on_deliver,
        }
    }

    /// Active in the check phase only.
    pub fn check() -> Self {
        Self::new(true, false)
    }

    /// Active in the deliver phase only.
    pub fn deliver() -> Self {
        Self::new(false, true)
    }

    fn active(&self, phase: Phase) -> bool {
        match phase {
            Phase::Check => self.on_check,
            Phase::Deliver => self.on_deliver,
        }
    }

    fn guarded(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let phase = next.phase();
        if !self.active(phase) {
            return next.call(ctx, store, tx);
        }

        let (res, (inserts, deletes)) = {
            let mut overlay = StateOverlay::new(store.unscoped_ref()?);
            let res = next.call(ctx, &mut ScopedState::root(&mut overlay), tx);
            (res, overlay.into_ordered_batch())
        };
        match res {
            Ok(out) => {
                store.unscoped()?.batch_apply(&inserts, &deletes)?;
                Ok(out)
            }
            Err(e) => {
                tracing::debug!(
                    target: "pipeline",
                    stage = self.name(),
                    discarded = inserts.len() + deletes.len(),
                    "rolled back checkpoint"
                );
                Err(e)
            }
        }
    }
}

impl Stage for Checkpoint {
    fn name(&self) -> &'static str {
        match (self.on_check, self.on_deliver) {
            (true, false) => "checkpoint_check",
            (false, true) => "checkpoint_deliver",
            _ => "checkpoint",
        }
    }

    fn scope(&self) -> StateScope {
        StateScope::Root
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        self.guarded(ctx, store, tx, next)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        self.guarded(ctx, store, tx, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::test_support::{run, Capture};
    use fermion_api::state::StateAccess;
    use fermion_state::memory::MemoryState;
    use fermion_types::app::{IbcMsg, Message};
    use std::sync::Arc;

    /// Writes above the checkpoint, then continues.
    struct Above;

    impl Stage for Above {
        fn name(&self) -> &'static str {
            "above"
        }
        fn check_tx(
            &self,
            ctx: &TxContext,
            store: &mut ScopedState<'_>,
            tx: &Tx,
            next: Next<'_>,
        ) -> Result<TxResult, TransactionError> {
            store.insert(b"k", b"check")?;
            next.call(ctx, store, tx)
        }
        fn deliver_tx(
            &self,
            ctx: &TxContext,
            store: &mut ScopedState<'_>,
            tx: &Tx,
            next: Next<'_>,
        ) -> Result<TxResult, TransactionError> {
            store.insert(b"k", b"deliver")?;
            next.call(ctx, store, tx)
        }
    }

    fn tx() -> Tx {
        Tx::msg(Message::Ibc(IbcMsg::RegisterChain {
            chain_id: "x".into(),
        }))
    }

    fn seeded() -> MemoryState {
        MemoryState::from_entries([(b"inner::hit".to_vec(), b"0".to_vec())])
    }

    #[test]
    fn test_failure_below_discards_only_inner_writes() {
        let mut store = seeded();
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(Above), Arc::new(Checkpoint::deliver())];
        let res = run(
            stages,
            &Capture::failing(),
            &TxContext::new("c", 1),
            &mut store,
            &tx(),
            Phase::Deliver,
        );
        assert!(res.is_err());
        assert_eq!(store.get(b"inner::hit").unwrap(), Some(b"0".to_vec()));
        assert_eq!(store.get(b"above::k").unwrap(), Some(b"deliver".to_vec()));
    }

    #[test]
    fn test_success_commits_inner_writes() {
        let mut store = seeded();
        let res = run(
            vec![Arc::new(Checkpoint::deliver())],
            &Capture::writing(),
            &TxContext::new("c", 1),
            &mut store,
            &tx(),
            Phase::Deliver,
        );
        assert_eq!(res.unwrap().log, "inner");
        assert_eq!(store.get(b"inner::hit").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_inactive_phase_passes_writes_through() {
        let mut store = seeded();
        let res = run(
            vec![Arc::new(Checkpoint::deliver())],
            &Capture::failing(),
            &TxContext::new("c", 1),
            &mut store,
            &tx(),
            Phase::Check,
        );
        assert!(res.is_err());
        // No overlay in the check phase: the failed write stays.
        assert_eq!(store.get(b"inner::hit").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_names_follow_phases() {
        assert_eq!(Checkpoint::check().name(), "checkpoint_check");
        assert_eq!(Checkpoint::deliver().name(), "checkpoint_deliver");
        assert_eq!(Checkpoint::new(true, true).name(), "checkpoint");
    }
}
