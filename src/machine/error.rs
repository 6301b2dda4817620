//! Dispatch errors.

use thiserror::Error;

use crate::core::action::ActionError;

/// Errors surfaced by signal dispatch.
///
/// Except for [`SignalError::NoTransition`] (which leaves the machine
/// untouched), every variant parks the machine in its error vertex;
/// [`Machine::failed`](crate::machine::Machine::failed) is the
/// documented way to detect the fault after the fact.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("no transition was found from state `{state}` and signal `{signal}`, machine `{machine}`")]
    NoTransition {
        machine: String,
        state: String,
        signal: String,
    },

    #[error("transition has no next state defined, machine `{machine}`")]
    UnresolvedTarget { machine: String, state: String },

    #[error("error state reached, machine `{machine}`")]
    ErrorStateReached { machine: String },

    #[error("`{label}` failed at state `{state}`: {source}")]
    ActionFailed {
        label: String,
        state: String,
        #[source]
        source: ActionError,
    },
}
