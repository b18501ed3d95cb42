// Path: crates/services/src/test_support.rs

//! Shared fixtures for the module tests.

use fermion_api::state::{ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Handler, MessageHandler, Next, Phase, Stage, TxResult};
use fermion_state::memory::MemoryState;
use fermion_types::app::{Actor, Coin, Coins, Message, Tx};
use fermion_types::error::TransactionError;
use std::sync::{Arc, Mutex};

pub const CHAIN: &str = "fermion";

pub fn actor(n: u8) -> Actor {
    Actor::new(CHAIN, "sigs", vec![n])
}

pub fn coins(list: &[(&str, u64)]) -> Coins {
    Coins(list.iter().map(|(d, a)| Coin::new(*d, *a)).collect())
}

pub fn ctx_signed_by(actors: &[Actor]) -> TxContext {
    TxContext::new(CHAIN, 1).with_signers(actors.iter().cloned())
}

/// Runs a handler in `phase` the way the dispatcher scopes it.
pub fn handle(
    handler: &dyn MessageHandler,
    ctx: &TxContext,
    store: &mut MemoryState,
    msg: &Message,
    phase: Phase,
) -> Result<TxResult, TransactionError> {
    let mut scoped = ScopedState::namespaced(store, handler.name(), handler.granted_namespaces());
    match phase {
        Phase::Check => handler.check(ctx, &mut scoped, msg),
        Phase::Deliver => handler.deliver(ctx, &mut scoped, msg),
    }
}

/// Applies a genesis option to a handler's namespace.
pub fn genesis(
    handler: &dyn MessageHandler,
    store: &mut MemoryState,
    key: &str,
    value: &str,
) -> Result<(), TransactionError> {
    let mut scoped = ScopedState::namespaced(store, handler.name(), handler.granted_namespaces());
    handler.init_state(&TxContext::new(CHAIN, 0), &mut scoped, key, value)
}

/// A terminal handler that records the context and transaction it received.
#[derive(Default)]
pub struct Capture {
    seen: Mutex<Option<(Vec<Actor>, Tx)>>,
}

impl Capture {
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
        _store: &mut dyn StateAccess,
        tx: &Tx,
        _phase: Phase,
    ) -> Result<TxResult, TransactionError> {
        *self.seen.lock().unwrap() = Some((ctx.signers().to_vec(), tx.clone()));
        Ok(TxResult::with_log("inner"))
    }
}

/// Runs a single stage over the root of `store`, ending at `terminal`.
pub fn run_stage(
    stage: Arc<dyn Stage>,
    terminal: &dyn Handler,
    ctx: &TxContext,
    store: &mut MemoryState,
    tx: &Tx,
    phase: Phase,
) -> Result<TxResult, TransactionError> {
    let stages = vec![stage];
    let mut root = ScopedState::root(store);
    Next::new(&stages, terminal, phase).call(ctx, &mut root, tx)
}
