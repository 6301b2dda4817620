//! Vertices: the nodes of the state graph, plus the per-vertex edge
//! index that drives transition selection.
//!
//! A vertex is either a durable state or a pseudo-state used for control
//! routing. Kind-specific rules ("a final vertex has no outgoing edges")
//! are enforced by the machine builder's validator, not by the type
//! system; every vertex is the same struct.

use std::collections::HashMap;

use super::action::Action;
use super::transition::Transition;

/// The closed set of vertex kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexKind {
    /// A durable state; may nest children and carry entry/exit actions.
    State,
    /// Dynamic branch point; resolved immediately via guarded epsilon
    /// transitions.
    Choice,
    /// Where the machine begins; advances on its own.
    Start,
    /// Default entry point of a composite state.
    Entry,
    /// Terminal state, no outgoing transitions allowed.
    Final,
    /// Terminal sink entered on any dispatch failure.
    Error,
}

impl std::fmt::Display for VertexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VertexKind::State => "state",
            VertexKind::Choice => "choice",
            VertexKind::Start => "start",
            VertexKind::Entry => "entry",
            VertexKind::Final => "final",
            VertexKind::Error => "error",
        };

        f.write_str(name)
    }
}

/// Outgoing transitions of one vertex, keyed by signal kind.
///
/// Guarded transitions are prepended to their kind's list and unguarded
/// ones appended, so guarded candidates always precede the catch-all
/// default within a kind. No ordering is defined across kinds.
pub(crate) struct EdgeIndex<C> {
    by_kind: HashMap<String, Vec<Transition<C>>>,
    epsilon: Vec<Transition<C>>,
    count: usize,
}

impl<C> Default for EdgeIndex<C> {
    fn default() -> Self {
        EdgeIndex {
            by_kind: HashMap::new(),
            epsilon: Vec::new(),
            count: 0,
        }
    }
}

impl<C> EdgeIndex<C> {
    pub(crate) fn add(&mut self, transition: Transition<C>) {
        let list = match transition.signal_kind() {
            Some(kind) => self.by_kind.entry(kind.to_owned()).or_default(),
            None => &mut self.epsilon,
        };

        if transition.guard().is_some() {
            list.insert(0, transition);
        } else {
            list.push(transition);
        }

        self.count += 1;
    }

    /// Ordered candidates for an exact signal-kind match; the epsilon
    /// key is itself a distinct kind.
    pub(crate) fn by_signal(&self, kind: Option<&str>) -> &[Transition<C>] {
        match kind {
            Some(kind) => self.by_kind.get(kind).map_or(&[], Vec::as_slice),
            None => &self.epsilon,
        }
    }

    /// All transitions regardless of kind, for validation and rendering.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Transition<C>> {
        self.epsilon
            .iter()
            .chain(self.by_kind.values().flatten())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Transition<C>> {
        self.epsilon
            .iter_mut()
            .chain(self.by_kind.values_mut().flatten())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A named node of the state graph.
///
/// Vertices are declared with symbolic parent/entry-state ids; the
/// machine builder resolves them to references when the graph is frozen.
///
/// # Example
///
/// ```rust
/// use statechart::{Signal, Transition, Vertex, VertexKind};
///
/// struct Handle;
///
/// impl Signal for Handle {
///     fn kind(&self) -> &str {
///         "handle"
///     }
/// }
///
/// let open: Vertex<()> = Vertex::state("open")
///     .transition(Transition::to("closed").on(Handle));
///
/// assert_eq!(open.id(), "open");
/// assert_eq!(open.kind(), VertexKind::State);
/// assert!(!open.is_final());
/// ```
pub struct Vertex<C> {
    id: String,
    kind: VertexKind,
    parent_id: Option<String>,
    entry_id: Option<String>,
    on_entry: Option<Action<C>>,
    on_exit: Option<Action<C>>,
    edges: EdgeIndex<C>,
    parent: Option<usize>,
    entry: Option<usize>,
}

impl<C> Vertex<C> {
    fn new(id: impl Into<String>, kind: VertexKind) -> Self {
        Vertex {
            id: id.into(),
            kind,
            parent_id: None,
            entry_id: None,
            on_entry: None,
            on_exit: None,
            edges: EdgeIndex::default(),
            parent: None,
            entry: None,
        }
    }

    /// A durable state.
    pub fn state(id: impl Into<String>) -> Self {
        Vertex::new(id, VertexKind::State)
    }

    /// A choice pseudo-state; resolves its guarded epsilon branches as
    /// soon as it is entered.
    pub fn choice(id: impl Into<String>) -> Self {
        Vertex::new(id, VertexKind::Choice)
    }

    /// The starting pseudo-state of a machine.
    pub fn start(id: impl Into<String>) -> Self {
        Vertex::new(id, VertexKind::Start)
    }

    /// An entry pseudo-state, the default landing point of a composite
    /// state.
    pub fn entry(id: impl Into<String>) -> Self {
        Vertex::new(id, VertexKind::Entry)
    }

    /// A final state; the validator rejects outgoing transitions on it.
    pub fn final_state(id: impl Into<String>) -> Self {
        Vertex::new(id, VertexKind::Final)
    }

    /// The error sink; the validator rejects outgoing transitions on it.
    pub fn error(id: impl Into<String>) -> Self {
        Vertex::new(id, VertexKind::Error)
    }

    /// Declare this vertex as nested inside the given composite state.
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Declare the pseudo-state entered by default whenever this vertex
    /// is the target of a transition. The builder forces that vertex's
    /// parent to be this vertex.
    pub fn entry_state(mut self, entry: impl Into<String>) -> Self {
        self.entry_id = Some(entry.into());
        self
    }

    /// Attach an entry action.
    pub fn on_entry(mut self, action: Action<C>) -> Self {
        self.on_entry = Some(action);
        self
    }

    /// Attach an exit action.
    pub fn on_exit(mut self, action: Action<C>) -> Self {
        self.on_exit = Some(action);
        self
    }

    /// Register an outgoing transition.
    pub fn transition(mut self, transition: Transition<C>) -> Self {
        self.edges.add(transition);
        self
    }

    /// Vertex identity, unique within its machine.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Vertex kind.
    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    /// Whether this vertex has no outgoing transitions. True for final
    /// and error vertices, and for any plain state that happens to have
    /// none.
    pub fn is_final(&self) -> bool {
        self.edges.is_empty()
    }

    /// Declared parent id, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Declared entry-state id, if any.
    pub fn entry_id(&self) -> Option<&str> {
        self.entry_id.as_deref()
    }

    pub(crate) fn entry_action(&self) -> Option<&Action<C>> {
        self.on_entry.as_ref()
    }

    pub(crate) fn exit_action(&self) -> Option<&Action<C>> {
        self.on_exit.as_ref()
    }

    pub(crate) fn edges(&self) -> &EdgeIndex<C> {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut EdgeIndex<C> {
        &mut self.edges
    }

    pub(crate) fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    pub(crate) fn entry_index(&self) -> Option<usize> {
        self.entry
    }

    pub(crate) fn set_parent(&mut self, parent: usize) {
        self.parent = Some(parent);
    }

    pub(crate) fn set_entry(&mut self, entry: usize) {
        self.entry = Some(entry);
    }
}
