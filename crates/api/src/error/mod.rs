// Path: crates/api/src/error/mod.rs
// Re-export all core error types from the central types crate.
pub use fermion_types::error::{
    ErrorCode, ErrorKind, GenesisError, StackError, StateError, TickError, TransactionError,
};
