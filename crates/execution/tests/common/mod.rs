// Path: crates/execution/tests/common/mod.rs
#![allow(dead_code)]

use fermion_api::state::ScopedState;
use fermion_api::transaction::TxResult;
use fermion_execution::App;
use fermion_services::coin;
use fermion_state::memory::MemoryState;
use fermion_test_utils::keys::{envelope, TestKey};
use fermion_types::app::{Actor, Coin, Message, PubKey, StakeMsg, Tx, ValidatorUpdate};
use fermion_types::config::{GenesisDoc, NodeConfig};
use fermion_types::error::TransactionError;
use fermion_types::keys::{namespace_prefix, COIN_NAMESPACE, NONCE_NAMESPACE};

pub const CHAIN: &str = "fermion";

// -----------------------------------------------------------------------------
// HELPER: Genesis
// -----------------------------------------------------------------------------

/// The `coin/account` option funding `key` with `amount` fermion.
pub fn funded(key: &TestKey, amount: u64) -> String {
    format!(
        r#"coin/account/{{"address":"{}","coins":[{{"denom":"fermion","amount":{}}}]}}"#,
        hex::encode(key.address()),
        amount
    )
}

pub fn genesis(options: Vec<String>) -> GenesisDoc {
    GenesisDoc {
        chain_id: CHAIN.to_string(),
        options,
    }
}

/// A standard application started from `options`.
pub fn started(options: Vec<String>) -> App {
    let mut app = App::new(&NodeConfig::new(CHAIN)).unwrap();
    app.init_chain(&genesis(options)).unwrap();
    app
}

// -----------------------------------------------------------------------------
// HELPER: Blocks
// -----------------------------------------------------------------------------

pub struct BlockOutcome {
    pub results: Vec<Result<TxResult, TransactionError>>,
    pub updates: Vec<ValidatorUpdate>,
}

/// Runs one full block: begin, deliver every tx, end, commit.
pub fn block(app: &mut App, txs: Vec<Tx>) -> BlockOutcome {
    app.begin_block(app.height() + 1).unwrap();
    let results = txs.iter().map(|tx| app.deliver_tx(tx)).collect();
    let updates = app.end_block().unwrap();
    app.commit().unwrap();
    BlockOutcome { results, updates }
}

// -----------------------------------------------------------------------------
// HELPER: Transactions and queries
// -----------------------------------------------------------------------------

/// `inner` signed by `key` at nonce `seq`.
pub fn signed(key: &TestKey, seq: u64, inner: Tx) -> Tx {
    envelope(CHAIN, seq, &[key], inner)
}

pub fn declare(validator: &TestKey, amount: u64) -> Tx {
    Tx::msg(Message::Stake(StakeMsg::DeclareCandidacy {
        pub_key: validator.pub_key(),
        bond: Coin::new("fermion", amount),
    }))
}

pub fn bond(validator: &TestKey, amount: u64) -> Tx {
    Tx::msg(Message::Stake(StakeMsg::Bond {
        pub_key: validator.pub_key(),
        amount: Coin::new("fermion", amount),
    }))
}

pub fn unbond(validator: &TestKey, shares: u64) -> Tx {
    Tx::msg(Message::Stake(StakeMsg::Unbond {
        pub_key: validator.pub_key(),
        shares,
    }))
}

pub fn update(validator: &TestKey, power: u64) -> ValidatorUpdate {
    ValidatorUpdate {
        pub_key: validator.pub_key(),
        power,
    }
}

pub fn pub_keys(updates: &[ValidatorUpdate]) -> Vec<PubKey> {
    updates.iter().map(|u| u.pub_key).collect()
}

/// The fermion balance of `actor` in `state`.
pub fn balance(state: &MemoryState, actor: &Actor) -> u64 {
    let mut state = state.clone();
    let view = ScopedState::namespaced(&mut state, COIN_NAMESPACE, &[]);
    coin::balance(&view, actor).unwrap().amount_of("fermion")
}

/// Every entry outside the replay-nonce namespace.
pub fn without_nonces(state: &MemoryState) -> Vec<(Vec<u8>, Vec<u8>)> {
    let prefix = namespace_prefix(NONCE_NAMESPACE);
    state
        .entries()
        .filter(|(k, _)| !k.starts_with(&prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
