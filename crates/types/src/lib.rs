// Path: crates/types/src/lib.rs
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
//! # Fermion Types
//!
//! Core data structures, canonical codec, configuration and error types shared
//! by every crate of the Fermion node. This crate has no knowledge of state
//! access or the processing pipeline.

/// Application-level data: identities, coins, transactions and staking records.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical data.
pub mod codec;
/// Configuration and genesis structures.
pub mod config;
/// Core error types.
pub mod error;
/// Namespaces and well-known state keys.
pub mod keys;

/// A curated set of the most commonly used types.
pub mod prelude {
    pub use crate::app::{
        Actor, Candidate, CandidateStatus, Coin, Coins, Message, MessageKind, PubKey, Tx,
        Validator, ValidatorUpdate,
    };
    pub use crate::error::{ErrorCode, ErrorKind, StateError, TickError, TransactionError};
}
