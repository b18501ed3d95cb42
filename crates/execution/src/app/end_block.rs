// Path: crates/execution/src/app/end_block.rs

//! Contains the logic that runs at the end of every block: reconciling the
//! candidate registry into a validator set and reporting the delta.

use fermion_api::lifecycle::Ticker;
use fermion_api::state::{ScopedState, StateAccess, StateOverlay};
use fermion_api::transaction::context::TxContext;
use fermion_services::stake::{load_candidates, validators_diff};
use fermion_telemetry::consensus_metrics;
use fermion_telemetry::time::Timer;
use fermion_types::app::ValidatorUpdate;
use fermion_types::error::{StateError, TickError};
use fermion_types::keys::STAKE_NAMESPACE;

/// A record that decodes badly means the registry itself is broken.
fn registry_error(e: StateError) -> TickError {
    match e {
        StateError::Decode(msg) => TickError::Registry(format!("corrupt candidate record: {msg}")),
        other => TickError::State(other),
    }
}

/// Recomputes voting power and returns the validator updates for consensus.
///
/// The power pass runs against an overlay that is applied in one batch only
/// once the whole pass has succeeded, so a failed tick leaves the registry as
/// it was. An unchanged registry yields an empty diff. Equal store contents
/// always give equal diffs.
pub fn tick(
    ctx: &TxContext,
    store: &mut dyn StateAccess,
) -> Result<Vec<ValidatorUpdate>, TickError> {
    let metrics = consensus_metrics();
    let _timer = Timer::tick(metrics);

    let (start, new, candidates, (inserts, deletes)) = {
        let mut overlay = StateOverlay::new(&*store);
        let (start, new, candidates) = {
            let mut scoped = ScopedState::namespaced(&mut overlay, STAKE_NAMESPACE, &[]);
            let mut registry = load_candidates(&scoped).map_err(registry_error)?;
            let start = registry.validators(&scoped).map_err(registry_error)?;
            let changed = registry
                .update_voting_power(&mut scoped)
                .map_err(registry_error)?;
            let new = if changed {
                Some(registry.validators(&scoped).map_err(registry_error)?)
            } else {
                None
            };
            (start, new, registry.len())
        };
        (start, new, candidates, overlay.into_ordered_batch())
    };
    store.batch_apply(&inserts, &deletes)?;

    let Some(new) = new else {
        tracing::debug!(
            target: "tick",
            height = ctx.block_height,
            candidates,
            "voting power unchanged"
        );
        return Ok(Vec::new());
    };

    let diff = validators_diff(&start, &new);
    metrics.inc_validator_updates(diff.len() as u64);
    tracing::info!(
        target: "tick",
        height = ctx.block_height,
        updates = diff.len(),
        validators = new.len(),
        "validator set changed"
    );
    for update in &diff {
        tracing::debug!(
            target: "tick",
            pub_key = %update.pub_key,
            power = update.power,
            "validator update"
        );
    }
    Ok(diff)
}

/// The [`Ticker`] the application runs once per block.
#[derive(Debug, Default, Clone, Copy)]
pub struct StakeTicker;

impl Ticker for StakeTicker {
    fn tick(
        &self,
        ctx: &TxContext,
        store: &mut dyn StateAccess,
    ) -> Result<Vec<ValidatorUpdate>, TickError> {
        tick(ctx, store)
    }
}
