// Path: crates/test_utils/src/lib.rs
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

//! # Fermion Test Utilities
//!
//! Assertion macros, deterministic keys, and transaction builders shared by
//! the unit and integration tests of every Fermion crate.

pub mod assertions;
pub mod keys;
pub mod randomness;
