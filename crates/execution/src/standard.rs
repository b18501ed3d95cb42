// Path: crates/execution/src/standard.rs

//! The production stage order.

use fermion_api::transaction::{MessageHandler, Stage};
use fermion_services::coin::CoinModule;
use fermion_services::fee::SimpleFee;
use fermion_services::ibc::{IbcModule, IbcStage};
use fermion_services::roles::{RolesModule, RolesStage};
use fermion_services::stake::StakeModule;
use fermion_tx::system::{ChainCheck, Checkpoint, Logger, Recovery, ReplayCheck, Signatures};
use fermion_tx::{Stack, StackBuilder};
use fermion_types::config::NodeConfig;
use fermion_types::error::StackError;
use std::sync::Arc;

/// Builds the stack every Fermion node runs.
///
/// Outer to inner: logging, panic recovery, signatures, chain binding, the
/// check-phase checkpoint, replay protection, the IBC envelope, roles, fees,
/// the deliver-phase checkpoint and finally the dispatcher over the coin,
/// roles, IBC and staking handlers.
pub fn standard_stack(config: &NodeConfig) -> Result<Stack, StackError> {
    let base: Vec<Arc<dyn Stage>> = vec![
        Arc::new(Logger::new()),
        Arc::new(Recovery),
        Arc::new(Signatures),
        Arc::new(ChainCheck),
        Arc::new(Checkpoint::check()),
        Arc::new(ReplayCheck),
    ];
    let apps: Vec<Arc<dyn Stage>> = vec![
        Arc::new(RolesStage),
        Arc::new(SimpleFee::from_config(&config.fee)),
        Arc::new(Checkpoint::deliver()),
    ];
    let handlers: Vec<Arc<dyn MessageHandler>> = vec![
        Arc::new(CoinModule),
        Arc::new(RolesModule),
        Arc::new(IbcModule),
        Arc::new(StakeModule),
    ];
    StackBuilder::new(base)
        .ibc(Arc::new(IbcStage))
        .apps(apps)
        .dispatch(handlers)
}
