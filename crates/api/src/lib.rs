// Path: crates/api/src/lib.rs

//! # Fermion API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Fermion API
//!
//! Core traits and interfaces shared by the pipeline stages, the module
//! handlers and the application driver.

/// Re-exports all core error types from the central `fermion-types` crate.
pub mod error;
/// Defines traits for components that hook into the block lifecycle.
pub mod lifecycle;
/// Core traits for state access, write overlays and namespaced views.
pub mod state;
/// The stage contract, the continuation driver and the terminal handler traits.
pub mod transaction;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::error::{ErrorCode, StateError, TickError, TransactionError};
    pub use crate::lifecycle::Ticker;
    pub use crate::state::{ScopedState, StateAccess, StateOverlay, StateScope};
    pub use crate::transaction::context::TxContext;
    pub use crate::transaction::{Handler, MessageHandler, Next, Phase, Stage, TxResult};
}
