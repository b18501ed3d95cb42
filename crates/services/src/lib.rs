// Path: crates/services/src/lib.rs
#![forbid(unsafe_code)]
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

//! Module stages and message handlers: coins, fees, roles, IBC and staking.

pub mod coin;
pub mod fee;
pub mod ibc;
pub mod roles;
pub mod stake;

#[cfg(test)]
pub(crate) mod test_support;
