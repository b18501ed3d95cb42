// Path: crates/api/src/state/mod.rs
//! Core traits for state management.
//!
//! - `StateAccess`: the key-value store interface every component programs against.
//! - `StateOverlay`: a copy-on-write write cache used as a rollback checkpoint.
//! - `ScopedState`: a view of the store confined to one module namespace.

use fermion_types::codec;
use fermion_types::error::StateError;
use parity_scale_codec::{Decode, Encode};
use std::sync::Arc;

/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state, using cheap-to-clone Arcs.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs from the state.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;

mod accessor;
mod overlay;
mod scoped;
#[cfg(test)]
pub(crate) mod test_store;

pub use accessor::*;
pub use overlay::*;
pub use scoped::{ScopedState, StateScope};

/// Reads and decodes a SCALE value. A missing key yields `None`.
pub fn read_decoded<T: Decode, S: StateAccess + ?Sized>(
    state: &S,
    key: &[u8],
) -> Result<Option<T>, StateError> {
    match state.get(key)? {
        Some(bytes) => codec::from_bytes_canonical(&bytes)
            .map(Some)
            .map_err(StateError::Decode),
        None => Ok(None),
    }
}

/// Encodes a value with SCALE and writes it.
pub fn write_encoded<T: Encode, S: StateAccess + ?Sized>(
    state: &mut S,
    key: &[u8],
    value: &T,
) -> Result<(), StateError> {
    let bytes = codec::to_bytes_canonical(value).map_err(StateError::InvalidValue)?;
    state.insert(key, &bytes)
}
