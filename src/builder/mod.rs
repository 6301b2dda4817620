//! Machine construction and validation.
//!
//! The builder accepts a name, a context value, a starting vertex, a
//! mandatory error vertex, and the full set of vertices, then freezes
//! them into an immutable [`Machine`]. All symbolic references (parent,
//! entry state, transition targets) are resolved exactly once here;
//! structurally invalid graphs are rejected and no machine is produced.

pub mod error;

pub use error::BuildError;

use std::collections::HashMap;

use tracing::debug;

use crate::core::transition::TransitionKind;
use crate::core::vertex::{Vertex, VertexKind};
use crate::machine::Machine;
use crate::snapshot::Snapshot;

/// Builder for [`Machine`] instances.
///
/// # Example
///
/// ```rust
/// use statechart::{MachineBuilder, Signal, Transition, Vertex};
///
/// struct Handle;
///
/// impl Signal for Handle {
///     fn kind(&self) -> &str {
///         "handle"
///     }
/// }
///
/// let machine = MachineBuilder::new()
///     .named("door")
///     .with_context(())
///     .starting_at("open")
///     .with_error_state(Vertex::error("error"))
///     .add_state(Vertex::state("open").transition(Transition::to("closed").on(Handle)))
///     .add_state(Vertex::state("closed"))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.current().id(), "open");
/// ```
pub struct MachineBuilder<C> {
    name: String,
    context: Option<C>,
    start: Option<String>,
    error_state: Option<Vertex<C>>,
    vertices: Vec<Vertex<C>>,
}

impl<C> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MachineBuilder<C> {
    pub fn new() -> Self {
        MachineBuilder {
            name: String::new(),
            context: None,
            start: None,
            error_state: None,
            vertices: Vec::new(),
        }
    }

    /// Name this machine, used in errors and diagram captions.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the extended state shared with every guard, effect, and
    /// action. Use `()` for machines without one.
    pub fn with_context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the vertex the machine starts at, by id.
    pub fn starting_at(mut self, id: impl Into<String>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Register the mandatory error vertex, entered whenever dispatch
    /// fails. It is added to the machine's vertex set.
    pub fn with_error_state(mut self, vertex: Vertex<C>) -> Self {
        self.error_state = Some(vertex);
        self
    }

    /// Register a single vertex.
    pub fn add_state(mut self, vertex: Vertex<C>) -> Self {
        self.vertices.push(vertex);
        self
    }

    /// Register several vertices at once.
    pub fn add_states(mut self, vertices: impl IntoIterator<Item = Vertex<C>>) -> Self {
        self.vertices.extend(vertices);
        self
    }

    /// Validate the graph and freeze it into a machine positioned at the
    /// starting vertex.
    pub fn build(self) -> Result<Machine<C>, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::MissingName);
        }

        let start_id = self.start.ok_or(BuildError::MissingStart)?;
        let error_vertex = self.error_state.ok_or(BuildError::MissingErrorState)?;
        let context = self.context.ok_or(BuildError::MissingContext)?;

        if error_vertex.kind() != VertexKind::Error {
            return Err(BuildError::InvalidErrorState(error_vertex.id().to_owned()));
        }

        let mut vertices = self.vertices;
        vertices.push(error_vertex);
        let error_index = vertices.len() - 1;

        let mut index = HashMap::new();
        for (i, vertex) in vertices.iter().enumerate() {
            if vertex.id().is_empty() {
                return Err(BuildError::EmptyVertexId);
            }

            if index.insert(vertex.id().to_owned(), i).is_some() {
                return Err(BuildError::DuplicateVertex(vertex.id().to_owned()));
            }
        }

        let start = *index
            .get(&start_id)
            .ok_or(BuildError::UnknownStart(start_id))?;

        link_parents(&mut vertices, &index)?;
        link_entry_states(&mut vertices, &index)?;
        reject_cycles(&vertices)?;
        link_transitions(&mut vertices, &index)?;

        for vertex in &vertices {
            validate_vertex(vertex)?;
        }

        debug!(
            machine = %self.name,
            states = vertices.len(),
            "machine graph validated"
        );

        Ok(Machine::from_parts(
            self.name,
            vertices,
            index,
            error_index,
            start,
            context,
        ))
    }

    /// Build the same machine and rehydrate it from a snapshot: the
    /// position override runs no guard, entry, or exit logic and both
    /// histories are taken verbatim; a single pseudo-state auto-progress
    /// pass (with normal selection and guards) runs afterwards.
    pub fn restore(self, snapshot: Snapshot) -> Result<Machine<C>, BuildError> {
        let machine = self.build()?;
        machine.rehydrate(snapshot)?;

        Ok(machine)
    }
}

fn link_parents<C>(
    vertices: &mut [Vertex<C>],
    index: &HashMap<String, usize>,
) -> Result<(), BuildError> {
    for i in 0..vertices.len() {
        let Some(parent_id) = vertices[i].parent_id().map(str::to_owned) else {
            continue;
        };

        let parent = *index
            .get(&parent_id)
            .ok_or_else(|| BuildError::UnknownParent {
                vertex: vertices[i].id().to_owned(),
                parent: parent_id,
            })?;

        vertices[i].set_parent(parent);
    }

    Ok(())
}

fn link_entry_states<C>(
    vertices: &mut [Vertex<C>],
    index: &HashMap<String, usize>,
) -> Result<(), BuildError> {
    for i in 0..vertices.len() {
        let Some(entry_id) = vertices[i].entry_id().map(str::to_owned) else {
            continue;
        };

        let entry = *index
            .get(&entry_id)
            .ok_or_else(|| BuildError::UnknownEntryState {
                vertex: vertices[i].id().to_owned(),
                entry: entry_id,
            })?;

        vertices[i].set_entry(entry);
        // An entry pseudo-state always belongs to the composite that
        // declared it, regardless of what the entry vertex itself says.
        vertices[entry].set_parent(i);
    }

    Ok(())
}

/// Parent and entry-state chains must be finite: the dispatch engine
/// walks both without bookkeeping, so a cycle would loop forever at
/// run time.
fn reject_cycles<C>(vertices: &[Vertex<C>]) -> Result<(), BuildError> {
    for vertex in vertices {
        let mut hops = 0;
        let mut next = vertex.entry_index();
        while let Some(i) = next {
            hops += 1;
            if hops > vertices.len() {
                return Err(BuildError::EntryCycle(vertex.id().to_owned()));
            }

            next = vertices[i].entry_index();
        }

        let mut hops = 0;
        let mut next = vertex.parent_index();
        while let Some(i) = next {
            hops += 1;
            if hops > vertices.len() {
                return Err(BuildError::ParentCycle(vertex.id().to_owned()));
            }

            next = vertices[i].parent_index();
        }
    }

    Ok(())
}

fn link_transitions<C>(
    vertices: &mut [Vertex<C>],
    index: &HashMap<String, usize>,
) -> Result<(), BuildError> {
    for i in 0..vertices.len() {
        let owner_id = vertices[i].id().to_owned();

        for transition in vertices[i].edges_mut().iter_mut() {
            let target_id = match transition.kind() {
                TransitionKind::Internal => owner_id.clone(),
                TransitionKind::Normal => transition
                    .target_id()
                    .ok_or_else(|| BuildError::MissingTarget {
                        vertex: owner_id.clone(),
                    })?
                    .to_owned(),
            };

            let target = *index
                .get(&target_id)
                .ok_or_else(|| BuildError::UnknownTarget {
                    vertex: owner_id.clone(),
                    target: target_id.clone(),
                })?;

            transition.resolve(target_id, target);
        }
    }

    Ok(())
}

fn validate_vertex<C>(vertex: &Vertex<C>) -> Result<(), BuildError> {
    if matches!(vertex.kind(), VertexKind::Final | VertexKind::Error)
        && !vertex.edges().is_empty()
    {
        return Err(BuildError::TerminalOutgoing {
            kind: vertex.kind().to_string(),
            vertex: vertex.id().to_owned(),
        });
    }

    if vertex.entry_action().is_some_and(|a| a.label().is_empty()) {
        return Err(BuildError::UnlabeledAction {
            vertex: vertex.id().to_owned(),
            hook: "entry".to_owned(),
        });
    }

    if vertex.exit_action().is_some_and(|a| a.label().is_empty()) {
        return Err(BuildError::UnlabeledAction {
            vertex: vertex.id().to_owned(),
            hook: "exit".to_owned(),
        });
    }

    for transition in vertex.edges().iter() {
        if transition.guard().is_some_and(|g| g.label().is_empty()) {
            return Err(BuildError::UnlabeledGuard(vertex.id().to_owned()));
        }

        if transition.effect().is_some_and(|e| e.label().is_empty()) {
            return Err(BuildError::UnlabeledEffect(vertex.id().to_owned()));
        }
    }

    Ok(())
}
