// Path: crates/services/src/stake/mod.rs
//! Proof-of-stake candidates and delegations.
//!
//! Bonded coins are moved into a module-held account in the `coin`
//! namespace, and one coin buys one share. Voting power is not touched here:
//! the end-block tick derives it from shares through [`CandidateSet`].

pub mod candidates;

pub use candidates::{
    load_candidate, load_candidates, save_candidate, validators_diff, CandidateSet,
};

use crate::coin;
use fermion_api::state::{read_decoded, write_encoded, ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{MessageHandler, TxResult};
use fermion_types::app::{
    Actor, Candidate, CandidateStatus, Coin, Coins, DelegatorBond, Message, MessageKind, PubKey,
    StakeMsg, StakeParams,
};
use fermion_types::error::{StateError, TransactionError};
use fermion_types::keys::{COIN_NAMESPACE, STAKE_BOND_PREFIX, STAKE_NAMESPACE, STAKE_PARAMS_KEY};
use parity_scale_codec::Encode;

/// Address of the account holding all bonded coins.
pub const HOLDING_ADDRESS: &[u8] = b"bonded";

/// The account bonded coins are held in on `chain_id`.
pub fn holding_actor(chain_id: &str) -> Actor {
    Actor::new(chain_id, STAKE_NAMESPACE, HOLDING_ADDRESS.to_vec())
}

/// The staking parameters, or the defaults if genesis never set them.
pub fn load_params<S: StateAccess + ?Sized>(store: &S) -> Result<StakeParams, StateError> {
    Ok(read_decoded(store, STAKE_PARAMS_KEY)?.unwrap_or_default())
}

pub fn write_params<S: StateAccess + ?Sized>(
    store: &mut S,
    params: &StakeParams,
) -> Result<(), StateError> {
    write_encoded(store, STAKE_PARAMS_KEY, params)
}

fn bond_key(delegator: &Actor, pub_key: &PubKey) -> Vec<u8> {
    [STAKE_BOND_PREFIX, &delegator.encode(), b"::", &pub_key.0].concat()
}

/// Shares `delegator` holds in the candidate `pub_key`.
pub fn bonded_shares<S: StateAccess + ?Sized>(
    store: &S,
    delegator: &Actor,
    pub_key: &PubKey,
) -> Result<u64, StateError> {
    Ok(read_decoded::<DelegatorBond, _>(store, &bond_key(delegator, pub_key))?
        .map(|b| b.shares)
        .unwrap_or(0))
}

fn set_bonded_shares<S: StateAccess + ?Sized>(
    store: &mut S,
    delegator: &Actor,
    pub_key: &PubKey,
    shares: u64,
) -> Result<(), StateError> {
    let key = bond_key(delegator, pub_key);
    if shares == 0 {
        store.delete(&key)
    } else {
        write_encoded(
            store,
            &key,
            &DelegatorBond {
                pub_key: *pub_key,
                shares,
            },
        )
    }
}

/// A validated staking operation, ready to be written.
struct Plan {
    candidate: Candidate,
    delegator: Actor,
    delegator_shares: u64,
    from: Actor,
    to: Actor,
    coins: Coins,
    log: String,
}

/// Handles `StakeMsg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StakeModule;

impl StakeModule {
    fn stake_msg(msg: &Message) -> Result<&StakeMsg, TransactionError> {
        match msg {
            Message::Stake(inner) => Ok(inner),
            other => Err(TransactionError::UnroutableMessage(format!(
                "stake module cannot handle '{}' messages",
                other.kind()
            ))),
        }
    }

    /// The first signer acts as owner or delegator.
    fn delegator(ctx: &TxContext) -> Result<Actor, TransactionError> {
        ctx.signers()
            .first()
            .cloned()
            .ok_or_else(|| TransactionError::Unauthorized("staking requires a signer".into()))
    }

    fn bond_coins(params: &StakeParams, coin: &Coin) -> Result<Coins, TransactionError> {
        if coin.denom != params.allowed_bond_denom {
            return Err(TransactionError::InvalidBondDenom {
                expected: params.allowed_bond_denom.clone(),
                got: coin.denom.clone(),
            });
        }
        if coin.amount == 0 {
            return Err(TransactionError::InvalidCoins("bond amount must be positive".into()));
        }
        Ok(Coins::from(coin.clone()))
    }

    fn plan(
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &StakeMsg,
    ) -> Result<Plan, TransactionError> {
        let params = load_params(&*store)?;
        let delegator = Self::delegator(ctx)?;
        let holder = holding_actor(&ctx.chain_id);

        let plan = match msg {
            StakeMsg::DeclareCandidacy { pub_key, bond } => {
                if load_candidate(&*store, pub_key)?.is_some() {
                    return Err(TransactionError::CandidateExists(pub_key.to_string()));
                }
                let coins = Self::bond_coins(&params, bond)?;
                let held = bonded_shares(&*store, &delegator, pub_key)?;
                Plan {
                    candidate: Candidate::new(*pub_key, delegator.clone(), bond.amount),
                    delegator_shares: held
                        .checked_add(bond.amount)
                        .ok_or(TransactionError::BalanceOverflow)?,
                    from: delegator.clone(),
                    to: holder,
                    coins,
                    log: format!("declared candidate {pub_key}"),
                    delegator,
                }
            }
            StakeMsg::Bond { pub_key, amount } => {
                let mut candidate = load_candidate(&*store, pub_key)?
                    .ok_or_else(|| TransactionError::CandidateNotFound(pub_key.to_string()))?;
                if candidate.status == CandidateStatus::Revoked {
                    return Err(TransactionError::Invalid(format!(
                        "candidate {pub_key} is revoked"
                    )));
                }
                let coins = Self::bond_coins(&params, amount)?;
                candidate.shares = candidate
                    .shares
                    .checked_add(amount.amount)
                    .ok_or(TransactionError::BalanceOverflow)?;
                // Bonding again before the tick clears an unbonding candidate revives it.
                candidate.status = CandidateStatus::Bonded;
                let held = bonded_shares(&*store, &delegator, pub_key)?;
                Plan {
                    candidate,
                    delegator_shares: held
                        .checked_add(amount.amount)
                        .ok_or(TransactionError::BalanceOverflow)?,
                    from: delegator.clone(),
                    to: holder,
                    coins,
                    log: format!("bonded {amount} to {pub_key}"),
                    delegator,
                }
            }
            StakeMsg::Unbond { pub_key, shares } => {
                if *shares == 0 {
                    return Err(TransactionError::Invalid("cannot unbond zero shares".into()));
                }
                let mut candidate = load_candidate(&*store, pub_key)?
                    .ok_or_else(|| TransactionError::CandidateNotFound(pub_key.to_string()))?;
                let held = bonded_shares(&*store, &delegator, pub_key)?;
                let remaining = held
                    .checked_sub(*shares)
                    .ok_or(TransactionError::InsufficientShares)?;
                candidate.shares = candidate
                    .shares
                    .checked_sub(*shares)
                    .ok_or(TransactionError::InsufficientShares)?;
                if candidate.shares == 0 {
                    candidate.status = CandidateStatus::Unbonding;
                }
                Plan {
                    candidate,
                    delegator_shares: remaining,
                    from: holder,
                    to: delegator.clone(),
                    coins: Coins::from(Coin::new(params.allowed_bond_denom.as_str(), *shares)),
                    log: format!("unbonded {shares} shares from {pub_key}"),
                    delegator,
                }
            }
        };
        Ok(plan)
    }
}

impl MessageHandler for StakeModule {
    fn name(&self) -> &'static str {
        STAKE_NAMESPACE
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Stake
    }

    fn granted_namespaces(&self) -> &[&'static str] {
        &[COIN_NAMESPACE]
    }

    fn check(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        let plan = Self::plan(ctx, store, Self::stake_msg(msg)?)?;
        let accounts = store.granted(COIN_NAMESPACE)?;
        coin::can_transfer(&accounts, &plan.from, &plan.to, &plan.coins)?;
        Ok(TxResult::default())
    }

    fn deliver(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        let plan = Self::plan(ctx, store, Self::stake_msg(msg)?)?;
        {
            let mut accounts = store.granted(COIN_NAMESPACE)?;
            coin::transfer(&mut accounts, &plan.from, &plan.to, &plan.coins)?;
        }
        save_candidate(store, &plan.candidate)?;
        set_bonded_shares(
            store,
            &plan.delegator,
            &plan.candidate.pub_key,
            plan.delegator_shares,
        )?;
        log::info!("[Stake] {}", plan.log);
        Ok(TxResult::with_log(plan.log))
    }

    fn init_state(
        &self,
        _ctx: &TxContext,
        store: &mut ScopedState<'_>,
        key: &str,
        value: &str,
    ) -> Result<(), TransactionError> {
        let mut params = load_params(&*store)?;
        match key {
            "allowed_bond_denom" => {
                if value.is_empty() {
                    return Err(TransactionError::Invalid("bond denomination is empty".into()));
                }
                params.allowed_bond_denom = value.to_string();
            }
            "max_vals" => {
                let max_vals: u32 = value
                    .parse()
                    .map_err(|e| TransactionError::Invalid(format!("bad max_vals '{value}': {e}")))?;
                if max_vals == 0 {
                    return Err(TransactionError::Invalid("max_vals must be positive".into()));
                }
                params.max_vals = max_vals;
            }
            other => {
                return Err(TransactionError::Invalid(format!(
                    "unknown stake genesis option '{other}'"
                )));
            }
        }
        write_params(store, &params)?;
        log::info!(
            "[Stake] genesis params: max_vals={}, bond denom={}",
            params.max_vals,
            params.allowed_bond_denom
        );
        Ok(())
    }
}
