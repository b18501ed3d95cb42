// Path: crates/node/src/commands/mod.rs

pub mod init;
pub mod reset;
pub mod start;
