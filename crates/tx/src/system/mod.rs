// Path: crates/tx/src/system/mod.rs

//! The base stages every Fermion chain runs, outermost first.

pub mod chain;
pub mod checkpoint;
pub mod logger;
pub mod nonce;
pub mod recovery;
pub mod validation;

pub use chain::ChainCheck;
pub use checkpoint::Checkpoint;
pub use logger::Logger;
pub use nonce::ReplayCheck;
pub use recovery::Recovery;
pub use validation::Signatures;

#[cfg(test)]
pub(crate) mod test_support;
