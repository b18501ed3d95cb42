// Path: crates/tx/src/stack/mod.rs

//! Assembles the transaction pipeline.
//!
//! A [`Stack`] is an explicit, ordered list of stages folded by
//! [`Next`] from the outside in, ending at a [`Dispatcher`]. The builder fixes
//! the layering: base stages first, then the optional IBC envelope stage,
//! then the app stages.

mod dispatcher;

pub use dispatcher::Dispatcher;

use fermion_api::state::{ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Handler, MessageHandler, Next, Phase, Stage, TxResult};
use fermion_types::app::Tx;
use fermion_types::error::{StackError, TransactionError};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Builds a [`Stack`] from its three layers and the terminal handlers.
pub struct StackBuilder {
    base: Vec<Arc<dyn Stage>>,
    ibc: Option<Arc<dyn Stage>>,
    apps: Vec<Arc<dyn Stage>>,
}

impl StackBuilder {
    /// Starts a stack with the given base stages, outermost first.
    pub fn new(base: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            base,
            ibc: None,
            apps: Vec::new(),
        }
    }

    /// Sets the IBC envelope stage, which runs between the base and app stages.
    pub fn ibc(mut self, stage: Arc<dyn Stage>) -> Self {
        self.ibc = Some(stage);
        self
    }

    /// Appends app stages, outermost first.
    pub fn apps(mut self, stages: Vec<Arc<dyn Stage>>) -> Self {
        self.apps.extend(stages);
        self
    }

    /// Finishes the stack with a dispatcher over `handlers`.
    ///
    /// Fails if two stages share a name or two handlers share a message kind.
    pub fn dispatch(self, handlers: Vec<Arc<dyn MessageHandler>>) -> Result<Stack, StackError> {
        let stages: Vec<Arc<dyn Stage>> = self
            .base
            .into_iter()
            .chain(self.ibc)
            .chain(self.apps)
            .collect();

        let mut seen = BTreeSet::new();
        for stage in &stages {
            if !seen.insert(stage.name()) {
                return Err(StackError::DuplicateStage(stage.name()));
            }
        }
        let dispatcher = Dispatcher::new(handlers)?;
        tracing::debug!(
            target: "pipeline",
            stages = stages.len(),
            routes = dispatcher.kinds().count(),
            "stack assembled"
        );
        Ok(Stack { stages, dispatcher })
    }
}

/// A composed pipeline: the stage list plus the dispatcher at its end.
pub struct Stack {
    stages: Vec<Arc<dyn Stage>>,
    dispatcher: Dispatcher,
}

impl Stack {
    /// Runs `tx` through every stage in `phase`.
    pub fn run(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
        phase: Phase,
    ) -> Result<TxResult, TransactionError> {
        let mut root = ScopedState::root(store);
        Next::new(&self.stages, &self.dispatcher, phase).call(ctx, &mut root, tx)
    }

    /// Runs the check phase.
    pub fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
    ) -> Result<TxResult, TransactionError> {
        self.run(ctx, store, tx, Phase::Check)
    }

    /// Runs the deliver phase.
    pub fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
    ) -> Result<TxResult, TransactionError> {
        self.run(ctx, store, tx, Phase::Deliver)
    }

    /// Stage names, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// The terminal dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Handler for Stack {
    fn handle(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
        phase: Phase,
    ) -> Result<TxResult, TransactionError> {
        self.run(ctx, store, tx, phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fermion_api::state::StateScope;
    use fermion_state::memory::MemoryState;
    use fermion_types::app::{Actor, CoinMsg, Coins, Message, MessageKind};

    struct Named(&'static str);

    impl Stage for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn scope(&self) -> StateScope {
            StateScope::Namespace(self.0)
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
            store.insert(b"order", &[next.remaining() as u8])?;
            next.call(ctx, store, tx)
        }
    }

    struct Sink;

    impl MessageHandler for Sink {
        fn name(&self) -> &'static str {
            "coin"
        }
        fn kind(&self) -> MessageKind {
            MessageKind::Coin
        }
        fn check(
            &self,
            _ctx: &TxContext,
            _store: &mut ScopedState<'_>,
            _msg: &Message,
        ) -> Result<TxResult, TransactionError> {
            Ok(TxResult::with_log("checked"))
        }
        fn deliver(
            &self,
            _ctx: &TxContext,
            _store: &mut ScopedState<'_>,
            _msg: &Message,
        ) -> Result<TxResult, TransactionError> {
            Ok(TxResult::with_log("delivered"))
        }
    }

    fn send() -> Tx {
        Tx::msg(Message::Coin(CoinMsg::Send {
            from: Actor::new("c", "sigs", vec![1]),
            to: Actor::new("c", "sigs", vec![2]),
            coins: Coins::default(),
        }))
    }

    #[test]
    fn test_layers_are_ordered_base_ibc_apps() {
        let stack = StackBuilder::new(vec![Arc::new(Named("a")), Arc::new(Named("b"))])
            .apps(vec![Arc::new(Named("d"))])
            .ibc(Arc::new(Named("c")))
            .dispatch(vec![Arc::new(Sink)])
            .unwrap();
        assert_eq!(stack.stage_names(), vec!["a", "b", "c", "d"]);

        let mut store = MemoryState::new();
        let ctx = TxContext::new("c", 1);
        assert_eq!(stack.check_tx(&ctx, &mut store, &send()).unwrap().log, "checked");
        assert!(store.is_empty());
        assert_eq!(
            stack.deliver_tx(&ctx, &mut store, &send()).unwrap().log,
            "delivered"
        );
        // Each stage saw the number of stages still below it.
        assert_eq!(store.get(b"a::order").unwrap(), Some(vec![3]));
        assert_eq!(store.get(b"d::order").unwrap(), Some(vec![0]));
    }

    #[test]
    fn test_duplicate_stage_name_is_rejected() {
        let res = StackBuilder::new(vec![Arc::new(Named("fee"))])
            .apps(vec![Arc::new(Named("fee"))])
            .dispatch(vec![Arc::new(Sink)]);
        assert!(matches!(res, Err(StackError::DuplicateStage("fee"))));
    }

    #[test]
    fn test_duplicate_route_surfaces_from_builder() {
        let res = StackBuilder::new(Vec::new()).dispatch(vec![Arc::new(Sink), Arc::new(Sink)]);
        assert!(matches!(res, Err(StackError::DuplicateRoute("coin"))));
    }
}
