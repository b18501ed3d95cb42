// Path: crates/tx/src/system/nonce.rs

//! Replay protection through per-signer-set sequence numbers.

use fermion_api::state::{read_decoded, write_encoded, ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Stage, TxResult};
use fermion_types::app::{Actor, NonceTx, Tx};
use fermion_types::error::{StateError, TransactionError};
use fermion_types::keys::{namespace_prefix, prefixed_key, NONCE_NAMESPACE, NONCE_SEQUENCE_PREFIX};
use parity_scale_codec::Encode;
use sha2::{Digest, Sha256};

/// The namespace-relative key holding the last sequence of a signer set.
///
/// The set is sorted first, so the order signers are listed in does not
/// matter.
pub fn sequence_key(signers: &[Actor]) -> Vec<u8> {
    let mut sorted = signers.to_vec();
    sorted.sort();
    sorted.dedup();
    let digest = Sha256::digest(sorted.encode());
    prefixed_key(NONCE_SEQUENCE_PREFIX, &digest)
}

/// The last used sequence of `signers`, read from an unscoped store.
pub fn current_sequence<S: StateAccess + ?Sized>(
    store: &S,
    signers: &[Actor],
) -> Result<u64, StateError> {
    let key = [namespace_prefix(NONCE_NAMESPACE), sequence_key(signers)].concat();
    Ok(read_decoded(store, &key)?.unwrap_or(0))
}

/// Consumes the `Nonce` envelope.
///
/// The new sequence is stored in both phases, so the check state rejects a
/// second copy of a transaction already admitted to the mempool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayCheck;

impl ReplayCheck {
    fn bump<'t>(
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &'t Tx,
    ) -> Result<&'t NonceTx, TransactionError> {
        let Tx::Nonce(nonce) = tx else {
            return Err(TransactionError::MissingNonce);
        };
        if nonce.signers.is_empty() {
            return Err(TransactionError::Unauthorized(
                "nonce envelope names no signers".into(),
            ));
        }
        if let Some(missing) = nonce.signers.iter().find(|s| !ctx.has_signer(s)) {
            return Err(TransactionError::Unauthorized(format!(
                "nonce signer {missing} did not sign"
            )));
        }

        let key = sequence_key(&nonce.signers);
        let stored: u64 = read_decoded(&*store, &key)?.unwrap_or(0);
        let expected = stored
            .checked_add(1)
            .ok_or_else(|| TransactionError::Invalid("nonce sequence exhausted".into()))?;
        if nonce.sequence != expected {
            return Err(TransactionError::BadNonce {
                expected,
                got: nonce.sequence,
            });
        }
        write_encoded(store, &key, &nonce.sequence)?;
        Ok(nonce)
    }
}

impl Stage for ReplayCheck {
    fn name(&self) -> &'static str {
        NONCE_NAMESPACE
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let nonce = Self::bump(ctx, store, tx)?;
        next.call(ctx, store, &nonce.inner)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let nonce = Self::bump(ctx, store, tx)?;
        next.call(ctx, store, &nonce.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::test_support::{run, Capture};
    use fermion_api::transaction::Phase;
    use fermion_state::memory::MemoryState;
    use fermion_test_utils::assert_err;
    use fermion_types::app::{IbcMsg, Message};
    use std::sync::Arc;

    fn alice() -> Actor {
        Actor::new("c", "sigs", vec![1])
    }

    fn bob() -> Actor {
        Actor::new("c", "sigs", vec![2])
    }

    fn nonce_tx(seq: u64, signers: Vec<Actor>) -> Tx {
        Tx::msg(Message::Ibc(IbcMsg::RegisterChain {
            chain_id: "x".into(),
        }))
        .with_nonce(seq, signers)
    }

    fn deliver(
        store: &mut MemoryState,
        ctx: &TxContext,
        tx: &Tx,
    ) -> Result<TxResult, TransactionError> {
        run(
            vec![Arc::new(ReplayCheck)],
            &Capture::default(),
            ctx,
            store,
            tx,
            Phase::Deliver,
        )
    }

    #[test]
    fn test_sequence_advances_and_replay_is_rejected() {
        let mut store = MemoryState::new();
        let ctx = TxContext::new("c", 1).with_signers([alice(), bob()]);

        deliver(&mut store, &ctx, &nonce_tx(1, vec![alice(), bob()])).unwrap();
        // Same signer set in a different order shares the counter.
        deliver(&mut store, &ctx, &nonce_tx(2, vec![bob(), alice()])).unwrap();
        assert_eq!(current_sequence(&store, &[alice(), bob()]).unwrap(), 2);

        let before = store.clone();
        assert_err!(
            deliver(&mut store, &ctx, &nonce_tx(2, vec![alice(), bob()])),
            TransactionError::BadNonce {
                expected: 3,
                got: 2
            }
        );
        assert_eq!(store, before);
        // A different signer set has its own counter.
        deliver(&mut store, &ctx, &nonce_tx(1, vec![alice()])).unwrap();
    }

    #[test]
    fn test_signers_must_be_authenticated() {
        let mut store = MemoryState::new();
        let ctx = TxContext::new("c", 1).with_signers([alice()]);
        assert_err!(
            deliver(&mut store, &ctx, &nonce_tx(1, vec![alice(), bob()])),
            TransactionError::Unauthorized(_)
        );
        assert_err!(
            deliver(&mut store, &ctx, &nonce_tx(1, Vec::new())),
            TransactionError::Unauthorized(_)
        );
        assert_err!(
            deliver(
                &mut store,
                &ctx,
                &Tx::msg(Message::Ibc(IbcMsg::RegisterChain {
                    chain_id: "x".into()
                }))
            ),
            TransactionError::MissingNonce
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_check_phase_also_records_sequence() {
        let mut store = MemoryState::new();
        let ctx = TxContext::new("c", 1).with_signers([alice()]);
        run(
            vec![Arc::new(ReplayCheck)],
            &Capture::default(),
            &ctx,
            &mut store,
            &nonce_tx(1, vec![alice()]),
            Phase::Check,
        )
        .unwrap();
        assert_eq!(current_sequence(&store, &[alice()]).unwrap(), 1);
    }
}
