// Path: crates/tx/src/system/recovery.rs

//! Turns a panic anywhere below this stage into an ordinary error.

use fermion_api::state::ScopedState;
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Stage, TxResult};
use fermion_types::app::Tx;
use fermion_types::error::TransactionError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Catches unwinding from inner stages and handlers.
///
/// The caught fault is reported as [`TransactionError::Recovered`], which the
/// logger and the application handle like any other rejection. Writes made
/// below a checkpoint are discarded with the overlay as the stack unwinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct Recovery;

/// Extracts the message of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl Recovery {
    fn guard(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let phase = next.phase();
        match panic::catch_unwind(AssertUnwindSafe(|| next.call(ctx, store, tx))) {
            Ok(res) => res,
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                tracing::error!(target: "pipeline", %phase, error = %msg, "recovered from panic");
                Err(TransactionError::Recovered(msg))
            }
        }
    }
}

impl Stage for Recovery {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        self.guard(ctx, store, tx, next)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        self.guard(ctx, store, tx, next)
    }
}
