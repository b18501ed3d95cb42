// Path: crates/execution/src/lib.rs
//! # Fermion Execution Crate Lints
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
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]
//! # Fermion Execution
//!
//! The application state machine: genesis, the check and deliver states,
//! the block lifecycle and the end-block validator reconciliation.

pub mod app;
pub mod standard;

pub use crate::app::end_block::{tick, StakeTicker};
pub use crate::app::App;
pub use crate::standard::standard_stack;
