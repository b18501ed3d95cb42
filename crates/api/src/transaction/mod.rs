// Path: crates/api/src/transaction/mod.rs
//! The stage contract and the driver that folds a stage list into one pipeline.
//!
//! A pipeline is an explicit, ordered slice of [`Stage`]s followed by one
//! terminal [`Handler`]. [`Next`] is the continuation handed to each stage: it
//! scopes the store for the following stage and invokes it, or invokes the
//! terminal handler once the slice is exhausted.

use crate::state::{ScopedState, StateAccess, StateScope};
use crate::transaction::context::TxContext;
use fermion_types::app::{Message, MessageKind, Tx};
use fermion_types::error::TransactionError;
use std::fmt;
use std::sync::Arc;

pub mod context;

/// The two execution phases of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Validation for mempool admission. Runs against the check state.
    Check,
    /// Validation plus state mutation, for transactions included in a block.
    Deliver,
}

impl Phase {
    /// A stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Check => "check",
            Phase::Deliver => "deliver",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of a successful pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxResult {
    /// Handler-defined response bytes.
    pub data: Vec<u8>,
    /// A human-readable log line.
    pub log: String,
    /// Gas accounted by the handler.
    pub gas: u64,
}

impl TxResult {
    /// A result carrying only a log line.
    pub fn with_log(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            ..Self::default()
        }
    }
}

/// One link of the transaction pipeline.
///
/// A stage either rejects the transaction by returning an error without
/// calling `next`, or does its bounded work and calls `next` exactly once,
/// propagating the result. `next` is consumed by the call, so a second call
/// does not compile. `ctx` and `store` are borrowed for the call only.
///
/// Writes a stage makes before calling `next` are visible to later stages.
/// They are rolled back when a later stage fails and an enclosing checkpoint
/// protects the current phase.
pub trait Stage: Send + Sync {
    /// A unique, stable name. Also the default namespace of the stage.
    fn name(&self) -> &'static str;

    /// The part of the store the stage receives.
    fn scope(&self) -> StateScope {
        StateScope::Namespace(self.name())
    }

    /// Other namespaces the stage may open through [`ScopedState::granted`].
    fn granted_namespaces(&self) -> &[&'static str] {
        &[]
    }

    /// Runs the stage in the check phase.
    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError>;

    /// Runs the stage in the deliver phase.
    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError>;
}

/// The end of a pipeline.
pub trait Handler: Send + Sync {
    /// Handles a transaction that every stage accepted.
    fn handle(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
        phase: Phase,
    ) -> Result<TxResult, TransactionError>;
}

/// A module that executes one kind of terminal message.
pub trait MessageHandler: Send + Sync {
    /// The module name, which is also its namespace.
    fn name(&self) -> &'static str;

    /// The message kind this handler is routed.
    fn kind(&self) -> MessageKind;

    /// Other namespaces the handler may open through [`ScopedState::granted`].
    fn granted_namespaces(&self) -> &[&'static str] {
        &[]
    }

    /// Validates the message without mutating state.
    fn check(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError>;

    /// Validates and executes the message.
    fn deliver(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError>;

    /// Applies one `module/key/value` genesis option.
    fn init_state(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        key: &str,
        value: &str,
    ) -> Result<(), TransactionError> {
        let _ = (ctx, store, value);
        Err(TransactionError::Invalid(format!(
            "module '{}' accepts no genesis option '{key}'",
            self.name()
        )))
    }
}

/// The continuation of a pipeline: the remaining stages and the terminal handler.
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    terminal: &'a dyn Handler,
    phase: Phase,
}

impl<'a> Next<'a> {
    /// A continuation that runs `stages` in order, then `terminal`.
    pub fn new(stages: &'a [Arc<dyn Stage>], terminal: &'a dyn Handler, phase: Phase) -> Self {
        Self {
            stages,
            terminal,
            phase,
        }
    }

    /// The phase this pipeline runs in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How many stages are left before the terminal handler.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }

    /// Runs the rest of the pipeline.
    ///
    /// The next stage receives a view of the same underlying store as `store`,
    /// scoped to that stage's own namespace.
    pub fn call(
        self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
    ) -> Result<TxResult, TransactionError> {
        let root = store.root_mut();
        let Some((stage, rest)) = self.stages.split_first() else {
            return self.terminal.handle(ctx, root, tx, self.phase);
        };
        let next = Next {
            stages: rest,
            terminal: self.terminal,
            phase: self.phase,
        };
        let mut scoped = ScopedState::open(root, stage.scope(), stage.granted_namespaces());
        match self.phase {
            Phase::Check => stage.check_tx(ctx, &mut scoped, tx, next),
            Phase::Deliver => stage.deliver_tx(ctx, &mut scoped, tx, next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_store::MapStore;
    use fermion_types::app::{Actor, CoinMsg, Coins};
    use std::sync::Mutex;

    /// Writes its name under its namespace, then continues.
    struct Marker(&'static str);

    impl Stage for Marker {
        fn name(&self) -> &'static str {
            self.0
        }
        fn check_tx(
            &self,
            ctx: &TxContext,
            store: &mut ScopedState<'_>,
            tx: &Tx,
            next: Next<'_>,
        ) -> Result<TxResult, TransactionError> {
            next.call(ctx, store, tx)
        }
        fn deliver_tx(
            &self,
            ctx: &TxContext,
            store: &mut ScopedState<'_>,
            tx: &Tx,
            next: Next<'_>,
        ) -> Result<TxResult, TransactionError> {
            store.insert(b"seen", self.0.as_bytes())?;
            let mut res = next.call(ctx, store, tx)?;
            res.log = format!("{}>{}", self.0, res.log);
            Ok(res)
        }
    }

    /// Rejects without calling the continuation.
    struct Reject;

    impl Stage for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }
        fn check_tx(
            &self,
            _ctx: &TxContext,
            _store: &mut ScopedState<'_>,
            _tx: &Tx,
            _next: Next<'_>,
        ) -> Result<TxResult, TransactionError> {
            Err(TransactionError::Invalid("rejected".into()))
        }
        fn deliver_tx(
            &self,
            _ctx: &TxContext,
            _store: &mut ScopedState<'_>,
            _tx: &Tx,
            _next: Next<'_>,
        ) -> Result<TxResult, TransactionError> {
            Err(TransactionError::Invalid("rejected".into()))
        }
    }

    #[derive(Default)]
    struct Terminal(Mutex<Vec<Phase>>);

    impl Handler for Terminal {
        fn handle(
            &self,
            _ctx: &TxContext,
            _store: &mut dyn StateAccess,
            _tx: &Tx,
            phase: Phase,
        ) -> Result<TxResult, TransactionError> {
            self.0.lock().unwrap().push(phase);
            Ok(TxResult::with_log("end"))
        }
    }

    fn tx() -> Tx {
        Tx::msg(Message::Coin(CoinMsg::Send {
            from: Actor::new("c", "sigs", vec![1]),
            to: Actor::new("c", "sigs", vec![2]),
            coins: Coins::default(),
        }))
    }

    #[test]
    fn test_stages_run_outside_in_with_own_namespaces() {
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(Marker("outer")), Arc::new(Marker("inner"))];
        let terminal = Terminal::default();
        let mut store = MapStore::default();
        let ctx = TxContext::new("c", 1);

        let res = {
            let mut root = ScopedState::root(&mut store);
            Next::new(&stages, &terminal, Phase::Deliver)
                .call(&ctx, &mut root, &tx())
                .unwrap()
        };

        assert_eq!(res.log, "outer>inner>end");
        assert_eq!(store.get(b"outer::seen").unwrap(), Some(b"outer".to_vec()));
        assert_eq!(store.get(b"inner::seen").unwrap(), Some(b"inner".to_vec()));
        assert_eq!(*terminal.0.lock().unwrap(), vec![Phase::Deliver]);
    }

    #[test]
    fn test_rejecting_stage_short_circuits() {
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(Reject), Arc::new(Marker("after"))];
        let terminal = Terminal::default();
        let mut store = MapStore::default();
        let mut root = ScopedState::root(&mut store);
        let next = Next::new(&stages, &terminal, Phase::Check);
        assert_eq!(next.remaining(), 2);
        assert_eq!(next.phase(), Phase::Check);

        assert!(next.call(&TxContext::new("c", 1), &mut root, &tx()).is_err());
        assert!(terminal.0.lock().unwrap().is_empty());
    }
}
