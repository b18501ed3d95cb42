// Path: crates/state/src/lib.rs
//! # Fermion State Crate Lints
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
        clippy::indexing_slicing
    )
)]
//! # Fermion State
//!
//! The ordered in-memory backend behind the committed and check states, its
//! deterministic root hash, and file snapshots.

pub mod memory;
pub mod snapshot;

/// A prelude for easily importing the most common types.
pub mod prelude {
    pub use crate::memory::MemoryState;
    pub use crate::snapshot::{load_snapshot, save_snapshot, Snapshot};
}
