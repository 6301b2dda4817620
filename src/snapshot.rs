//! Snapshot and restore support.
//!
//! A [`Snapshot`] is the only serializable artifact of a machine: a
//! flat projection of one state id, one final flag, and both histories.
//! Restoring through
//! [`MachineBuilder::restore`](crate::builder::MachineBuilder::restore)
//! never replays entry/exit logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the snapshot codecs.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization to JSON or binary format failed.
    #[error("snapshot serialization failed: {0}")]
    Serialize(String),

    /// Deserialization from JSON or binary format failed.
    #[error("snapshot deserialization failed: {0}")]
    Deserialize(String),
}

/// Serializable projection of a machine's position and histories.
///
/// # Example
///
/// ```rust
/// use statechart::Snapshot;
///
/// let snapshot = Snapshot {
///     state_id: "closed".to_owned(),
///     is_final: false,
///     signals_history: vec!["handle".to_owned()],
///     states_history: vec!["open".to_owned(), "closed".to_owned()],
/// };
///
/// let json = snapshot.to_json().unwrap();
/// let restored = Snapshot::from_json(&json).unwrap();
/// assert_eq!(snapshot, restored);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current state id.
    pub state_id: String,

    /// Whether the current state has no outgoing transitions.
    pub is_final: bool,

    /// History of signal kinds applied to the machine.
    pub signals_history: Vec<String>,

    /// History of states the machine has passed through.
    pub states_history: Vec<String>,
}

impl Snapshot {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|err| SnapshotError::Serialize(err.to_string()))
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|err| SnapshotError::Deserialize(err.to_string()))
    }

    /// Encode as a compact binary blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|err| SnapshotError::Serialize(err.to_string()))
    }

    /// Decode from a binary blob produced by [`Snapshot::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(|err| SnapshotError::Deserialize(err.to_string()))
    }
}
