//! Core types of the state graph.
//!
//! Everything here is declarative: vertices, transitions, guards, and
//! actions are assembled by the host and handed to the
//! [`MachineBuilder`](crate::builder::MachineBuilder), which freezes
//! them into an immutable graph.

pub mod action;
pub mod signal;
pub mod transition;
pub mod vertex;

pub use action::{Action, ActionError, Effect, Guard};
pub use signal::{Signal, EPSILON};
pub use transition::{Transition, TransitionKind};
pub use vertex::{Vertex, VertexKind};
