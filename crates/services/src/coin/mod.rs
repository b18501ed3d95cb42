// Path: crates/services/src/coin/mod.rs
//! The coin module: account balances and transfers.
//!
//! Balances are stored under `account::<SCALE(actor)>` in the `coin`
//! namespace. The free functions here are also used by the fee stage and the
//! staking module, which reach the namespace through a grant.

use fermion_api::state::{read_decoded, write_encoded, ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{MessageHandler, TxResult};
use fermion_types::app::{Actor, CoinMsg, Coins, Message, MessageKind};
use fermion_types::error::{StateError, TransactionError};
use fermion_types::keys::{prefixed_key, COIN_ACCOUNT_PREFIX, COIN_NAMESPACE, SIGS_NAMESPACE};
use parity_scale_codec::Encode;
use serde::Deserialize;

fn account_key(actor: &Actor) -> Vec<u8> {
    prefixed_key(COIN_ACCOUNT_PREFIX, &actor.encode())
}

/// The balance of `actor`. An unknown account holds nothing.
pub fn balance<S: StateAccess + ?Sized>(store: &S, actor: &Actor) -> Result<Coins, StateError> {
    Ok(read_decoded(store, &account_key(actor))?.unwrap_or_default())
}

fn set_balance<S: StateAccess + ?Sized>(
    store: &mut S,
    actor: &Actor,
    coins: &Coins,
) -> Result<(), StateError> {
    let key = account_key(actor);
    if coins.is_zero() {
        store.delete(&key)
    } else {
        write_encoded(store, &key, coins)
    }
}

/// Rejects malformed or empty coin sets.
pub fn validate_coins(coins: &Coins) -> Result<(), TransactionError> {
    if !coins.is_valid() {
        return Err(TransactionError::InvalidCoins(format!(
            "'{coins}' must be sorted, unique and positive"
        )));
    }
    if coins.is_zero() {
        return Err(TransactionError::InvalidCoins("no coins given".into()));
    }
    Ok(())
}

/// Credits `coins` to `actor` and returns the new balance.
pub fn add_coins<S: StateAccess + ?Sized>(
    store: &mut S,
    actor: &Actor,
    coins: &Coins,
) -> Result<Coins, TransactionError> {
    let updated = balance(&*store, actor)?
        .checked_add(coins)
        .ok_or(TransactionError::BalanceOverflow)?;
    set_balance(store, actor, &updated)?;
    Ok(updated)
}

/// Debits `coins` from `actor` and returns the new balance.
pub fn subtract_coins<S: StateAccess + ?Sized>(
    store: &mut S,
    actor: &Actor,
    coins: &Coins,
) -> Result<Coins, TransactionError> {
    let updated = balance(&*store, actor)?
        .checked_sub(coins)
        .ok_or(TransactionError::InsufficientFunds)?;
    set_balance(store, actor, &updated)?;
    Ok(updated)
}

/// Verifies that `from` could pay `coins` to `to`, without writing.
pub fn can_transfer<S: StateAccess + ?Sized>(
    store: &S,
    from: &Actor,
    to: &Actor,
    coins: &Coins,
) -> Result<(), TransactionError> {
    validate_coins(coins)?;
    balance(store, from)?
        .checked_sub(coins)
        .ok_or(TransactionError::InsufficientFunds)?;
    if from != to {
        balance(store, to)?
            .checked_add(coins)
            .ok_or(TransactionError::BalanceOverflow)?;
    }
    Ok(())
}

/// Moves `coins` from `from` to `to`.
pub fn transfer<S: StateAccess + ?Sized>(
    store: &mut S,
    from: &Actor,
    to: &Actor,
    coins: &Coins,
) -> Result<(), TransactionError> {
    can_transfer(&*store, from, to, coins)?;
    subtract_coins(store, from, coins)?;
    add_coins(store, to, coins)?;
    Ok(())
}

/// The `coin/account/<json>` genesis value.
#[derive(Deserialize)]
struct GenesisAccount {
    /// Hex-encoded account address.
    address: String,
    #[serde(default = "default_app")]
    app: String,
    coins: Coins,
}

fn default_app() -> String {
    SIGS_NAMESPACE.to_string()
}

/// Handles `CoinMsg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoinModule;

impl CoinModule {
    fn send_of(msg: &Message) -> Result<(&Actor, &Actor, &Coins), TransactionError> {
        match msg {
            Message::Coin(CoinMsg::Send { from, to, coins }) => Ok((from, to, coins)),
            other => Err(TransactionError::UnroutableMessage(format!(
                "coin module cannot handle '{}' messages",
                other.kind()
            ))),
        }
    }

    fn authorize(ctx: &TxContext, from: &Actor) -> Result<(), TransactionError> {
        if ctx.has_signer(from) {
            Ok(())
        } else {
            Err(TransactionError::Unauthorized(format!(
                "sender {from} did not sign"
            )))
        }
    }
}

impl MessageHandler for CoinModule {
    fn name(&self) -> &'static str {
        COIN_NAMESPACE
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Coin
    }

    fn check(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        let (from, to, coins) = Self::send_of(msg)?;
        Self::authorize(ctx, from)?;
        can_transfer(&*store, from, to, coins)?;
        Ok(TxResult::default())
    }

    fn deliver(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        let (from, to, coins) = Self::send_of(msg)?;
        Self::authorize(ctx, from)?;
        transfer(store, from, to, coins)?;
        log::debug!("[Coin] sent {} from {} to {}", coins, from, to);
        Ok(TxResult::with_log(format!("sent {coins}")))
    }

    fn init_state(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        key: &str,
        value: &str,
    ) -> Result<(), TransactionError> {
        if key != "account" {
            return Err(TransactionError::Invalid(format!(
                "unknown coin genesis option '{key}'"
            )));
        }
        let account: GenesisAccount = serde_json::from_str(value)
            .map_err(|e| TransactionError::Deserialization(e.to_string()))?;
        let address = hex::decode(&account.address)
            .map_err(|e| TransactionError::Invalid(format!("bad account address: {e}")))?;
        let coins = Coins::normalized(account.coins.0).ok_or(TransactionError::BalanceOverflow)?;
        let actor = Actor::new(ctx.chain_id.as_str(), account.app, address);
        let total = add_coins(store, &actor, &coins)?;
        log::info!("[Coin] genesis account {} holds {}", actor, total);
        Ok(())
    }
}
