// Path: crates/tx/src/stack/dispatcher.rs

//! Routes a terminal message to the one handler registered for its kind.

use fermion_api::state::{ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Handler, MessageHandler, Phase, TxResult};
use fermion_types::app::{MessageKind, Tx};
use fermion_types::error::{StackError, TransactionError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The terminal handler of every stack.
///
/// Routing is an exact match on [`MessageKind`]; there is no fallback and at
/// most one handler runs per transaction.
pub struct Dispatcher {
    routes: BTreeMap<MessageKind, Arc<dyn MessageHandler>>,
}

impl Dispatcher {
    /// Builds the routing table. Two handlers for one kind is a build error.
    pub fn new(handlers: Vec<Arc<dyn MessageHandler>>) -> Result<Self, StackError> {
        let mut routes = BTreeMap::new();
        for handler in handlers {
            let kind = handler.kind();
            if routes.insert(kind, handler).is_some() {
                return Err(StackError::DuplicateRoute(kind.as_str()));
            }
        }
        Ok(Self { routes })
    }

    /// The handler routed `kind`, if any.
    pub fn route(&self, kind: MessageKind) -> Option<&Arc<dyn MessageHandler>> {
        self.routes.get(&kind)
    }

    /// The handler whose module name is `name`, if any.
    pub fn module(&self, name: &str) -> Option<&Arc<dyn MessageHandler>> {
        self.routes.values().find(|h| h.name() == name)
    }

    /// Every routed kind, in order.
    pub fn kinds(&self) -> impl Iterator<Item = MessageKind> + '_ {
        self.routes.keys().copied()
    }
}

impl Handler for Dispatcher {
    fn handle(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
        tx: &Tx,
        phase: Phase,
    ) -> Result<TxResult, TransactionError> {
        let Tx::Msg(msg) = tx else {
            return Err(TransactionError::UnroutableMessage(format!(
                "unconsumed '{}' envelope reached the dispatcher",
                tx.layer()
            )));
        };
        let kind = msg.kind();
        let handler = self.route(kind).ok_or_else(|| {
            TransactionError::UnroutableMessage(format!("no handler for '{kind}' messages"))
        })?;
        tracing::debug!(target: "pipeline", %phase, route = kind.as_str(), "dispatching message");

        let mut scoped =
            ScopedState::namespaced(store, handler.name(), handler.granted_namespaces());
        match phase {
            Phase::Check => handler.check(ctx, &mut scoped, msg),
            Phase::Deliver => handler.deliver(ctx, &mut scoped, msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fermion_state::memory::MemoryState;
    use fermion_test_utils::assert_err;
    use fermion_types::app::{Actor, CoinMsg, Coins, IbcMsg, Message};

    /// Records every delivered message under its own namespace.
    struct Echo(MessageKind, &'static str);

    impl MessageHandler for Echo {
        fn name(&self) -> &'static str {
            self.1
        }
        fn kind(&self) -> MessageKind {
            self.0
        }
        fn check(
            &self,
            _ctx: &TxContext,
            _store: &mut ScopedState<'_>,
            _msg: &Message,
        ) -> Result<TxResult, TransactionError> {
            Ok(TxResult::with_log(self.1))
        }
        fn deliver(
            &self,
            _ctx: &TxContext,
            store: &mut ScopedState<'_>,
            _msg: &Message,
        ) -> Result<TxResult, TransactionError> {
            store.insert(b"hit", b"1")?;
            Ok(TxResult::with_log(self.1))
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
    fn test_routes_by_exact_kind() {
        let dispatcher = Dispatcher::new(vec![
            Arc::new(Echo(MessageKind::Coin, "coin")),
            Arc::new(Echo(MessageKind::Roles, "roles")),
        ])
        .unwrap();
        let mut store = MemoryState::new();
        let res = dispatcher
            .handle(&TxContext::new("c", 1), &mut store, &send(), Phase::Deliver)
            .unwrap();
        assert_eq!(res.log, "coin");
        assert!(store.get(b"coin::hit").unwrap().is_some());
        assert!(store.get(b"roles::hit").unwrap().is_none());
        assert_eq!(dispatcher.kinds().count(), 2);
        assert!(dispatcher.module("roles").is_some());
    }

    #[test]
    fn test_unregistered_kind_is_unroutable_and_writes_nothing() {
        let dispatcher = Dispatcher::new(vec![Arc::new(Echo(MessageKind::Coin, "coin"))]).unwrap();
        let mut store = MemoryState::new();
        let tx = Tx::msg(Message::Ibc(IbcMsg::RegisterChain {
            chain_id: "other".into(),
        }));
        assert_err!(
            dispatcher.handle(&TxContext::new("c", 1), &mut store, &tx, Phase::Deliver),
            TransactionError::UnroutableMessage(_)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_leftover_envelope_is_unroutable() {
        let dispatcher = Dispatcher::new(vec![Arc::new(Echo(MessageKind::Coin, "coin"))]).unwrap();
        let mut store = MemoryState::new();
        let tx = send().with_role(b"admins".to_vec());
        assert_err!(
            dispatcher.handle(&TxContext::new("c", 1), &mut store, &tx, Phase::Check),
            TransactionError::UnroutableMessage(_)
        );
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let err = Dispatcher::new(vec![
            Arc::new(Echo(MessageKind::Roles, "roles")),
            Arc::new(Echo(MessageKind::Roles, "roles2")),
        ]);
        assert!(matches!(err, Err(StackError::DuplicateRoute("roles"))));
    }
}
