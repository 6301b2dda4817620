//! Structural build and restore errors.

use thiserror::Error;

use crate::machine::SignalError;

/// Errors rejected by the machine builder's validator. No machine is
/// produced when any of these occur.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no name was provided for this machine")]
    MissingName,

    #[error("no starting state was provided")]
    MissingStart,

    #[error("starting state `{0}` was not found in this machine")]
    UnknownStart(String),

    #[error("no error state was defined")]
    MissingErrorState,

    #[error("error state `{0}` must be an error-kind vertex")]
    InvalidErrorState(String),

    #[error("no context was provided for this machine")]
    MissingContext,

    #[error("invalid state identity, cannot be empty")]
    EmptyVertexId,

    #[error("state `{0}` was registered more than once")]
    DuplicateVertex(String),

    #[error("state `{vertex}` declares parent `{parent}` which was not found in this machine")]
    UnknownParent { vertex: String, parent: String },

    #[error("state `{vertex}` declares entry state `{entry}` which was not found in this machine")]
    UnknownEntryState { vertex: String, entry: String },

    #[error("transition from `{vertex}` has no target state")]
    MissingTarget { vertex: String },

    #[error("transition from `{vertex}` targets `{target}` which was not found in this machine")]
    UnknownTarget { vertex: String, target: String },

    #[error("{kind} state `{vertex}` cannot have outgoing transitions")]
    TerminalOutgoing { kind: String, vertex: String },

    #[error("guard on a transition from `{0}` has no label")]
    UnlabeledGuard(String),

    #[error("effect on a transition from `{0}` has no label")]
    UnlabeledEffect(String),

    #[error("{hook} action of state `{vertex}` has no label")]
    UnlabeledAction { vertex: String, hook: String },

    #[error("state `{0}` is part of an entry state cycle")]
    EntryCycle(String),

    #[error("state `{0}` is part of a parent cycle")]
    ParentCycle(String),

    #[error("snapshot state `{0}` does not exist")]
    UnknownSnapshotState(String),

    #[error("auto-progress after restore failed: {0}")]
    Restore(#[from] SignalError),
}
