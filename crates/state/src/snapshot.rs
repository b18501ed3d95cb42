// Path: crates/state/src/snapshot.rs
//! Persists the committed state between node runs.

use crate::memory::MemoryState;
use fermion_types::codec;
use fermion_types::error::StateError;
use parity_scale_codec::{Decode, Encode};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// The on-disk form of a committed state.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The height of the last committed block.
    pub height: u64,
    /// The root hash at that height.
    pub root_hash: [u8; 32],
    /// Every entry in key order.
    pub entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Snapshot {
    /// Captures `state` at `height`.
    pub fn capture(height: u64, state: &MemoryState) -> Self {
        Self {
            height,
            root_hash: state.root_hash(),
            entries: state
                .entries()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Rebuilds the store, verifying the recorded root hash.
    pub fn restore(self) -> Result<MemoryState, StateError> {
        let state = MemoryState::from_entries(self.entries);
        if state.root_hash() != self.root_hash {
            return Err(StateError::InvalidValue(
                "snapshot root hash does not match its entries".into(),
            ));
        }
        Ok(state)
    }
}

/// Writes the snapshot to `path`, replacing any previous one.
///
/// The bytes are written to a sibling temp file first and renamed into place,
/// so a crash mid-write leaves the previous snapshot intact.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StateError> {
    let bytes = codec::to_bytes_canonical(snapshot).map_err(StateError::InvalidValue)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| StateError::Backend(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| StateError::Backend(e.to_string()))?;
    log::debug!(
        "saved snapshot at height {} ({} entries) to {}",
        snapshot.height,
        snapshot.entries.len(),
        path.display()
    );
    Ok(())
}

/// Reads a snapshot. A missing file yields `None`.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, StateError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StateError::Backend(e.to_string())),
    };
    codec::from_bytes_canonical(&bytes)
        .map(Some)
        .map_err(StateError::Decode)
}
