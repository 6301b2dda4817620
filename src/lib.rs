//! Hierarchical state machine library.
//!
//! A machine is described declaratively through
//! [`MachineBuilder`]: vertices (plain states, composite states with
//! entry pseudo-states, choice points, start/final markers, one error
//! sink) and the transitions between them, each with an optional
//! trigger [`Signal`], [`Guard`], and effect [`Action`]. `build`
//! validates the description, freezes it into an immutable graph, and
//! hands back a [`Machine`] that is driven exclusively through
//! [`Machine::signal`].
//!
//! Dispatch follows UML statechart conventions: unhandled signals
//! bubble to enclosing states, composite targets descend through their
//! entry pseudo-states, exit and entry actions run in order, and
//! pseudo-states (start, choice, entry) advance on their own. Any
//! failing guard-less transition chain, effect, or entry/exit action
//! escalates the machine into its error vertex.
//!
//! # Example
//!
//! ```rust
//! use statechart::{MachineBuilder, Signal, Transition, Vertex};
//!
//! struct Handle;
//!
//! impl Signal for Handle {
//!     fn kind(&self) -> &str {
//!         "handle"
//!     }
//! }
//!
//! struct Keys;
//!
//! impl Signal for Keys {
//!     fn kind(&self) -> &str {
//!         "keys"
//!     }
//! }
//!
//! let machine = MachineBuilder::new()
//!     .named("door")
//!     .with_context(())
//!     .starting_at("open")
//!     .with_error_state(Vertex::error("error"))
//!     .add_state(
//!         Vertex::state("open").transition(Transition::to("closed").on(Handle)),
//!     )
//!     .add_state(
//!         Vertex::state("closed")
//!             .transition(Transition::to("open").on(Handle))
//!             .transition(Transition::to("locked").on(Keys)),
//!     )
//!     .add_state(
//!         Vertex::state("locked").transition(Transition::to("closed").on(Keys)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! machine.signal(&Handle).unwrap();
//! machine.signal(&Keys).unwrap();
//! assert!(machine.at("locked"));
//! assert!(!machine.failed());
//! ```
//!
//! Machines can be checkpointed through [`Machine::snapshot`] and
//! revived later with
//! [`MachineBuilder::restore`], and rendered as PlantUML diagrams via
//! [`PlantUml`].

pub mod builder;
pub mod core;
pub mod machine;
pub mod render;
pub mod snapshot;

pub use builder::{BuildError, MachineBuilder};
pub use core::{
    Action, ActionError, Effect, Guard, Signal, Transition, TransitionKind, Vertex, VertexKind,
    EPSILON,
};
pub use machine::{Machine, SignalError};
pub use render::{PlantUml, Renderer};
pub use snapshot::{Snapshot, SnapshotError};
