// Path: crates/tx/src/system/validation.rs

//! Signature verification.

use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use fermion_api::state::ScopedState;
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{Next, Stage, TxResult};
use fermion_types::app::{account_address, Actor, PubKey, SignedTx, Tx};
use fermion_types::error::TransactionError;
use fermion_types::keys::SIGS_NAMESPACE;

/// Verifies a single ed25519 signature over `msg`.
pub fn verify_signature(
    pub_key: &PubKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), TransactionError> {
    let key = VerifyingKey::from_bytes(&pub_key.0).map_err(|e| {
        TransactionError::InvalidSignature(format!("bad public key {pub_key}: {e}"))
    })?;
    let bytes = <[u8; 64]>::try_from(signature).map_err(|_| {
        TransactionError::InvalidSignature(format!(
            "signature must be 64 bytes, got {}",
            signature.len()
        ))
    })?;
    key.verify(msg, &Ed25519Signature::from_bytes(&bytes))
        .map_err(|_| {
            TransactionError::InvalidSignature(format!("signature by {pub_key} does not verify"))
        })
}

/// Consumes the `Signed` envelope and grants one `sigs` actor per valid key.
#[derive(Debug, Default, Clone, Copy)]
pub struct Signatures;

impl Signatures {
    fn authenticate<'t>(
        ctx: &TxContext,
        tx: &'t Tx,
    ) -> Result<(TxContext, &'t SignedTx), TransactionError> {
        let Tx::Signed(signed) = tx else {
            return Err(TransactionError::MissingSignature);
        };
        if signed.signatures.is_empty() {
            return Err(TransactionError::MissingSignature);
        }
        let sign_bytes = signed.inner.sign_bytes();
        let mut actors = Vec::with_capacity(signed.signatures.len());
        for sig in &signed.signatures {
            verify_signature(&sig.pub_key, &sign_bytes, &sig.signature)?;
            actors.push(Actor::new(
                ctx.chain_id.as_str(),
                SIGS_NAMESPACE,
                account_address(&sig.pub_key),
            ));
        }
        Ok((ctx.with_signers(actors), signed))
    }
}

impl Stage for Signatures {
    fn name(&self) -> &'static str {
        SIGS_NAMESPACE
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let (ctx, signed) = Self::authenticate(ctx, tx)?;
        next.call(&ctx, store, &signed.inner)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let (ctx, signed) = Self::authenticate(ctx, tx)?;
        next.call(&ctx, store, &signed.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::test_support::{run, Capture};
    use fermion_api::transaction::Phase;
    use fermion_state::memory::MemoryState;
    use fermion_test_utils::assert_err;
    use fermion_test_utils::keys::{send_msg, sign_tx, TestKey};
    use fermion_types::app::{Coins, IbcMsg, Message};
    use std::sync::Arc;

    fn stages() -> Vec<Arc<dyn Stage>> {
        vec![Arc::new(Signatures)]
    }

    fn inner(alice: &TestKey, bob: &TestKey) -> Tx {
        send_msg(&alice.actor("c"), &bob.actor("c"), Coins::default())
    }

    #[test]
    fn test_valid_signatures_grant_actors_and_unwrap() {
        let (alice, bob) = (TestKey::numbered(1), TestKey::numbered(2));
        let msg = inner(&alice, &bob);
        let tx = sign_tx(msg.clone(), &[&alice, &bob]);
        let capture = Capture::default();
        run(
            stages(),
            &capture,
            &TxContext::new("c", 1),
            &mut MemoryState::new(),
            &tx,
            Phase::Check,
        )
        .unwrap();
        assert_eq!(capture.signers(), vec![alice.actor("c"), bob.actor("c")]);
        assert_eq!(capture.tx(), Some(msg));
    }

    #[test]
    fn test_unsigned_and_empty_envelopes_are_rejected() {
        let (alice, bob) = (TestKey::numbered(1), TestKey::numbered(2));
        let ctx = TxContext::new("c", 1);
        let mut store = MemoryState::new();
        assert_err!(
            run(
                stages(),
                &Capture::default(),
                &ctx,
                &mut store,
                &inner(&alice, &bob),
                Phase::Deliver
            ),
            TransactionError::MissingSignature
        );
        let empty = sign_tx(inner(&alice, &bob), &[]);
        assert_err!(
            run(
                stages(),
                &Capture::default(),
                &ctx,
                &mut store,
                &empty,
                Phase::Deliver
            ),
            TransactionError::MissingSignature
        );
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let (alice, bob) = (TestKey::numbered(1), TestKey::numbered(2));
        let Tx::Signed(mut signed) = sign_tx(inner(&alice, &bob), &[&alice]) else {
            panic!("expected signature envelope");
        };
        // Alice's signature now covers a different payload.
        signed.inner = Box::new(inner(&bob, &alice));
        let capture = Capture::default();
        assert_err!(
            run(
                stages(),
                &capture,
                &TxContext::new("c", 1),
                &mut MemoryState::new(),
                &Tx::Signed(signed),
                Phase::Deliver
            ),
            TransactionError::InvalidSignature(_)
        );
        assert!(capture.tx().is_none());
    }

    #[test]
    fn test_truncated_signature_is_invalid() {
        let alice = TestKey::numbered(1);
        let mut sig = alice.sign(&Tx::msg(Message::Ibc(IbcMsg::RegisterChain {
            chain_id: "x".into(),
        })));
        sig.signature.truncate(10);
        assert_err!(
            verify_signature(&sig.pub_key, b"msg", &sig.signature),
            TransactionError::InvalidSignature(_)
        );
    }
}
