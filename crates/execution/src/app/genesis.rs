// Path: crates/execution/src/app/genesis.rs

//! Loads the genesis document into a fresh state.

use fermion_api::state::{ScopedState, StateAccess};
use fermion_api::transaction::context::TxContext;
use fermion_api::transaction::MessageHandler;
use fermion_services::stake::write_params;
use fermion_tx::Dispatcher;
use fermion_types::app::StakeParams;
use fermion_types::config::{GenesisDoc, StakeConfig};
use fermion_types::error::GenesisError;
use fermion_types::keys::STAKE_NAMESPACE;

/// Writes the configured staking limits, then hands every genesis option to
/// the module it names. Options are applied in document order, so a later
/// option overrides an earlier one.
pub(super) fn apply_genesis(
    chain_id: &str,
    dispatcher: &Dispatcher,
    stake: &StakeConfig,
    doc: &GenesisDoc,
    store: &mut dyn StateAccess,
) -> Result<usize, GenesisError> {
    if doc.chain_id != chain_id {
        return Err(GenesisError::ChainMismatch {
            expected: chain_id.to_string(),
            got: doc.chain_id.clone(),
        });
    }
    let options = doc.parsed_options()?;

    let params = StakeParams {
        max_vals: stake.max_vals,
        allowed_bond_denom: stake.allowed_bond_denom.clone(),
    };
    {
        let mut scoped = ScopedState::namespaced(&mut *store, STAKE_NAMESPACE, &[]);
        write_params(&mut scoped, &params).map_err(|e| GenesisError::Rejected {
            module: STAKE_NAMESPACE.to_string(),
            key: "params".to_string(),
            source: e.into(),
        })?;
    }

    let ctx = TxContext::new(chain_id, 0);
    for option in &options {
        let handler = dispatcher
            .module(&option.module)
            .ok_or_else(|| GenesisError::UnknownModule(option.module.clone()))?;
        let mut scoped =
            ScopedState::namespaced(&mut *store, handler.name(), handler.granted_namespaces());
        handler
            .init_state(&ctx, &mut scoped, &option.key, &option.value)
            .map_err(|source| GenesisError::Rejected {
                module: option.module.clone(),
                key: option.key.clone(),
                source,
            })?;
        tracing::debug!(
            target: "app",
            module = %option.module,
            key = %option.key,
            "genesis option applied"
        );
    }
    Ok(options.len())
}
