// Path: crates/tx/src/lib.rs
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
//! # Fermion Transaction Pipeline
//!
//! Assembles stages and message handlers into a [`Stack`] and provides the
//! base stages every chain runs: logging, panic recovery, signature
//! verification, chain binding, checkpoints and replay protection.

pub mod stack;
pub mod system;

pub use stack::{Dispatcher, Stack, StackBuilder};
