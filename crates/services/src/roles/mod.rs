// Path: crates/services/src/roles/mod.rs
//! Multi-signature roles.
//!
//! A role is a named group of actors with a signing threshold. The handler
//! creates roles; the stage lets a transaction act as a role once enough of
//! its members have signed.

use fermion_api::state::{read_decoded, write_encoded, ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::{MessageHandler, Next, Stage, TxResult};
use fermion_types::app::{Actor, AssumeRoleTx, Message, MessageKind, Role, RolesMsg, Tx};
use fermion_types::error::{StateError, TransactionError};
use fermion_types::keys::{prefixed_key, ROLES_NAMESPACE, ROLE_PREFIX};
use std::collections::BTreeSet;

/// The app name of role actors.
pub const ROLE_APP: &str = "role";

fn role_key(name: &[u8]) -> Vec<u8> {
    prefixed_key(ROLE_PREFIX, name)
}

/// Loads a role definition.
pub fn load_role<S: StateAccess + ?Sized>(
    store: &S,
    name: &[u8],
) -> Result<Option<Role>, StateError> {
    read_decoded(store, &role_key(name))
}

/// The actor a transaction holds after assuming `name` on `chain_id`.
pub fn role_actor(chain_id: &str, name: &[u8]) -> Actor {
    Actor::new(chain_id, ROLE_APP, name.to_vec())
}

fn display_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Unwraps `AssumeRole` envelopes, granting each role whose threshold is met.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolesStage;

impl RolesStage {
    fn assume<'t>(
        ctx: &TxContext,
        store: &ScopedState<'_>,
        mut tx: &'t Tx,
    ) -> Result<(TxContext, &'t Tx), TransactionError> {
        let mut ctx = ctx.clone();
        // A role may itself be a member of another role, so envelopes nest.
        while let Tx::AssumeRole(AssumeRoleTx { role, inner }) = tx {
            let name = display_name(role);
            let def = load_role(store, role)?
                .ok_or_else(|| TransactionError::RoleNotFound(name.clone()))?;
            let present = def.signers.iter().filter(|s| ctx.has_signer(s)).count();
            if (present as u64) < u64::from(def.min_sigs) {
                return Err(TransactionError::Unauthorized(format!(
                    "role '{name}' needs {} signatures, got {present}",
                    def.min_sigs
                )));
            }
            log::debug!("[Roles] assumed role '{}'", name);
            ctx = ctx.with_signers([role_actor(&ctx.chain_id, role)]);
            tx = inner.as_ref();
        }
        Ok((ctx, tx))
    }
}

impl Stage for RolesStage {
    fn name(&self) -> &'static str {
        ROLES_NAMESPACE
    }

    fn check_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let (ctx, inner) = Self::assume(ctx, store, tx)?;
        next.call(&ctx, store, inner)
    }

    fn deliver_tx(
        &self,
        ctx: &TxContext,
        store: &mut ScopedState<'_>,
        tx: &Tx,
        next: Next<'_>,
    ) -> Result<TxResult, TransactionError> {
        let (ctx, inner) = Self::assume(ctx, store, tx)?;
        next.call(&ctx, store, inner)
    }
}

/// Handles `RolesMsg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolesModule;

impl RolesModule {
    fn validate<'m>(
        store: &ScopedState<'_>,
        msg: &'m Message,
    ) -> Result<(&'m [u8], Role), TransactionError> {
        let Message::Roles(RolesMsg::CreateRole {
            role,
            min_sigs,
            signers,
        }) = msg
        else {
            return Err(TransactionError::UnroutableMessage(format!(
                "roles module cannot handle '{}' messages",
                msg.kind()
            )));
        };
        if role.is_empty() {
            return Err(TransactionError::Invalid("role name is empty".into()));
        }
        if *min_sigs == 0 || *min_sigs as usize > signers.len() {
            return Err(TransactionError::Invalid(format!(
                "min_sigs must be between 1 and {}, got {min_sigs}",
                signers.len()
            )));
        }
        let unique: BTreeSet<&Actor> = signers.iter().collect();
        if unique.len() != signers.len() {
            return Err(TransactionError::Invalid("role signers must be unique".into()));
        }
        if load_role(store, role)?.is_some() {
            return Err(TransactionError::RoleAlreadyExists(display_name(role)));
        }
        Ok((
            role.as_slice(),
            Role {
                min_sigs: *min_sigs,
                signers: signers.clone(),
            },
        ))
    }
}

impl MessageHandler for RolesModule {
    fn name(&self) -> &'static str {
        ROLES_NAMESPACE
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Roles
    }

    fn check(
        &self,
        _ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        Self::validate(store, msg)?;
        Ok(TxResult::default())
    }

    fn deliver(
        &self,
        _ctx: &TxContext,
        store: &mut ScopedState<'_>,
        msg: &Message,
    ) -> Result<TxResult, TransactionError> {
        let (name, role) = Self::validate(store, msg)?;
        write_encoded(store, &role_key(name), &role)?;
        log::info!(
            "[Roles] created role '{}' ({} of {})",
            display_name(name),
            role.min_sigs,
            role.signers.len()
        );
        Ok(TxResult::with_log(format!("created role {}", display_name(name))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{actor, ctx_signed_by, handle, run_stage, Capture, CHAIN};
    use fermion_api::transaction::Phase;
    use fermion_state::memory::MemoryState;
    use fermion_test_utils::assert_err;
    use fermion_types::app::IbcMsg;
    use std::sync::Arc;

    fn create(name: &str, min_sigs: u32, signers: Vec<Actor>) -> Message {
        Message::Roles(RolesMsg::CreateRole {
            role: name.as_bytes().to_vec(),
            min_sigs,
            signers,
        })
    }

    fn with_role(name: &str, min_sigs: u32, signers: Vec<Actor>) -> MemoryState {
        let mut store = MemoryState::new();
        handle(
            &RolesModule,
            &TxContext::new(CHAIN, 1),
            &mut store,
            &create(name, min_sigs, signers),
            Phase::Deliver,
        )
        .unwrap();
        store
    }

    fn msg() -> Tx {
        Tx::msg(Message::Ibc(IbcMsg::RegisterChain {
            chain_id: "x".into(),
        }))
    }

    #[test]
    fn test_create_role_rules() {
        let mut store = with_role("admins", 2, vec![actor(1), actor(2), actor(3)]);
        let ctx = TxContext::new(CHAIN, 1);
        assert_err!(
            handle(
                &RolesModule,
                &ctx,
                &mut store,
                &create("admins", 1, vec![actor(1)]),
                Phase::Check
            ),
            TransactionError::RoleAlreadyExists(_)
        );
        for bad in [
            create("ops", 0, vec![actor(1)]),
            create("ops", 2, vec![actor(1)]),
            create("ops", 1, vec![actor(1), actor(1)]),
            create("", 1, vec![actor(1)]),
        ] {
            assert_err!(
                handle(&RolesModule, &ctx, &mut store, &bad, Phase::Deliver),
                TransactionError::Invalid(_)
            );
        }
        let view = ScopedState::namespaced(&mut store, ROLES_NAMESPACE, &[]);
        assert_eq!(load_role(&view, b"admins").unwrap().unwrap().min_sigs, 2);
        assert!(load_role(&view, b"ops").unwrap().is_none());
    }

    #[test]
    fn test_threshold_met_grants_role_actor() {
        let mut store = with_role("admins", 2, vec![actor(1), actor(2), actor(3)]);
        let capture = Capture::default();
        run_stage(
            Arc::new(RolesStage),
            &capture,
            &ctx_signed_by(&[actor(1), actor(3)]),
            &mut store,
            &msg().with_role("admins"),
            Phase::Deliver,
        )
        .unwrap();
        assert_eq!(capture.tx(), Some(msg()));
        assert!(capture.signers().contains(&role_actor(CHAIN, b"admins")));
    }

    #[test]
    fn test_threshold_not_met_or_unknown_role() {
        let mut store = with_role("admins", 2, vec![actor(1), actor(2)]);
        assert_err!(
            run_stage(
                Arc::new(RolesStage),
                &Capture::default(),
                &ctx_signed_by(&[actor(1), actor(9)]),
                &mut store,
                &msg().with_role("admins"),
                Phase::Check,
            ),
            TransactionError::Unauthorized(_)
        );
        assert_err!(
            run_stage(
                Arc::new(RolesStage),
                &Capture::default(),
                &ctx_signed_by(&[actor(1)]),
                &mut store,
                &msg().with_role("nobody"),
                Phase::Check,
            ),
            TransactionError::RoleNotFound(_)
        );
    }

    #[test]
    fn test_nested_roles_and_passthrough() {
        let mut store = with_role("admins", 1, vec![actor(1)]);
        handle(
            &RolesModule,
            &TxContext::new(CHAIN, 1),
            &mut store,
            &create("council", 1, vec![role_actor(CHAIN, b"admins")]),
            Phase::Deliver,
        )
        .unwrap();

        let capture = Capture::default();
        let tx = msg().with_role("council").with_role("admins");
        run_stage(
            Arc::new(RolesStage),
            &capture,
            &ctx_signed_by(&[actor(1)]),
            &mut store,
            &tx,
            Phase::Deliver,
        )
        .unwrap();
        assert!(capture.signers().contains(&role_actor(CHAIN, b"council")));

        run_stage(
            Arc::new(RolesStage),
            &capture,
            &ctx_signed_by(&[actor(1)]),
            &mut store,
            &msg(),
            Phase::Deliver,
        )
        .unwrap();
        assert_eq!(capture.signers(), vec![actor(1)]);
    }
}
