// Path: crates/tx/src/system/test_support.rs

//! Harness for exercising one stage in isolation.

use fermion_api::state::{ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Handler, Next, Phase, Stage, TxResult};
use fermion_types::app::{Actor, Tx};
use fermion_types::error::TransactionError;
use std::sync::{Arc, Mutex};

/// A terminal handler that records what reached it.
#[derive(Default)]
pub(crate) struct Capture {
    pub seen: Mutex<Option<(Vec<Actor>, Tx)>>,
    /// Writes `inner::hit` before returning.
    pub write: bool,
    /// Fails after writing.
    pub fail: bool,
}

impl Capture {
    pub fn writing() -> Self {
        Self {
            write: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            write: true,
            fail: true,
            ..Self::default()
        }
    }

    pub fn signers(&self) -> Vec<Actor> {
        self.seen
            .lock()
            .unwrap()
            .as_ref()
            .map(|(s, _)| s.clone())
            .unwrap_or_default()
    }

    pub fn tx(&self) -> Option<Tx> {
        self.seen.lock().unwrap().as_ref().map(|(_, t)| t.clone())
    }
}

impl Handler for Capture {
    fn handle(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
        _phase: Phase,
    ) -> Result<TxResult, TransactionError> {
        *self.seen.lock().unwrap() = Some((ctx.signers().to_vec(), tx.clone()));
        if self.write {
            store.insert(b"inner::hit", b"1")?;
        }
        if self.fail {
            return Err(TransactionError::Invalid("inner failure".into()));
        }
        Ok(TxResult::with_log("inner"))
    }
}

/// Runs `stages` over the root of `store`, ending at `terminal`.
pub(crate) fn run(
    stages: Vec<Arc<dyn Stage>>,
    terminal: &dyn Handler,
    ctx: &TxContext,
    store: &mut dyn StateAccess,
    tx: &Tx,
    phase: Phase,
) -> Result<TxResult, TransactionError> {
    let mut root = ScopedState::root(store);
    Next::new(&stages, terminal, phase).call(ctx, &mut root, tx)
}
