//! Diagram rendering.
//!
//! Renderers are read-only consumers of a built machine: they enumerate
//! its vertices and transitions, evaluate guards against the live
//! context, and produce a textual representation. They never mutate the
//! machine.

pub mod plantuml;

pub use plantuml::PlantUml;

use crate::machine::Machine;

/// A read-only machine renderer.
pub trait Renderer<C> {
    /// Produce a representation of the machine in whatever notation the
    /// renderer decides (e.g. PlantUML plain text).
    fn render(&self, machine: &Machine<C>) -> String;
}
