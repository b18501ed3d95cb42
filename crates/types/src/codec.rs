// Path: crates/types/src/codec.rs

//! Canonical binary codec for state records and sign bytes.
//!
//! Every module stores its records with the same SCALE (`parity-scale-codec`)
//! encoding. Validator-set agreement depends on independent nodes producing
//! byte-identical state, so nothing outside this module picks a format.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical byte representation.
///
/// Trailing bytes are an error: a record either decodes exactly or not at all.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}
