//! The dispatch engine.
//!
//! A [`Machine`] owns the frozen vertex graph produced by the builder
//! and drives it: external signals are matched against the current
//! vertex's edges (bubbling to ancestors when unhandled), pseudo-states
//! advance on their own, and any failure escalates to the error vertex.
//!
//! Position, both histories, and the context live together behind one
//! read/write lock: a `signal` call holds the write half for the whole
//! auto-progress + selection + execution sequence, while queries share
//! the read half. Calling back into the same machine from inside a
//! guard, effect, or action deadlocks and is not supported.

pub mod error;

pub use error::SignalError;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::{debug, trace, warn};

use crate::builder::BuildError;
use crate::core::action::Action;
use crate::core::signal::{Signal, EPSILON};
use crate::core::transition::{Transition, TransitionKind};
use crate::core::vertex::{Vertex, VertexKind};
use crate::snapshot::Snapshot;

/// Mutable half of a machine: current position, histories, and the
/// host's extended state. Guarded as a unit by the machine's lock.
pub(crate) struct Cursor<C> {
    pub(crate) current: usize,
    pub(crate) context: C,
    pub(crate) signals_history: Vec<String>,
    pub(crate) states_history: Vec<String>,
}

/// A hierarchical state machine.
///
/// Built once via [`MachineBuilder`](crate::builder::MachineBuilder);
/// the graph is immutable afterwards, only position, histories, and the
/// context change, and only through [`Machine::signal`].
pub struct Machine<C> {
    name: String,
    vertices: Vec<Vertex<C>>,
    index: HashMap<String, usize>,
    error_state: usize,
    cursor: RwLock<Cursor<C>>,
}

impl<C> Machine<C> {
    pub(crate) fn from_parts(
        name: String,
        vertices: Vec<Vertex<C>>,
        index: HashMap<String, usize>,
        error_state: usize,
        start: usize,
        context: C,
    ) -> Self {
        let states_history = vec![vertices[start].id().to_owned()];

        Machine {
            name,
            vertices,
            index,
            error_state,
            cursor: RwLock::new(Cursor {
                current: start,
                context,
                signals_history: Vec::new(),
                states_history,
            }),
        }
    }

    /// The machine's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the given signal, firing the corresponding transition if
    /// one is available from the current vertex or any of its ancestors.
    ///
    /// Pending pseudo-state auto-progress is resolved first. On failure
    /// the machine is parked in its error vertex (except when no
    /// transition matched, which leaves it unchanged) and the error is
    /// returned.
    pub fn signal(&self, signal: &dyn Signal) -> Result<(), SignalError> {
        let mut cursor = self.cursor.write();

        debug!(
            machine = %self.name,
            signal = signal.kind(),
            state = self.vertices[cursor.current].id(),
            "dispatching signal"
        );

        self.try_progress(&mut cursor)?;
        self.apply(&mut cursor, Some(signal))
    }

    /// The vertex the machine currently occupies.
    pub fn current(&self) -> &Vertex<C> {
        let current = self.cursor.read().current;
        &self.vertices[current]
    }

    /// Whether the machine is at the given vertex, or at any vertex
    /// nested inside it.
    pub fn at(&self, id: &str) -> bool {
        let current = self.cursor.read().current;

        if self.vertices[current].id() == id {
            return true;
        }

        let mut parent = self.vertices[current].parent_index();
        while let Some(i) = parent {
            if self.vertices[i].id() == id {
                return true;
            }

            parent = self.vertices[i].parent_index();
        }

        false
    }

    /// Whether the current vertex has no outgoing transitions.
    pub fn finished(&self) -> bool {
        let current = self.cursor.read().current;
        self.vertices[current].is_final()
    }

    /// Whether the machine is parked in its error vertex.
    pub fn failed(&self) -> bool {
        self.cursor.read().current == self.error_state
    }

    /// Whether signaling the given signal would fire a transition,
    /// considering the current vertex, its ancestors, and live guard
    /// evaluation.
    pub fn can(&self, signal: &dyn Signal) -> bool {
        let cursor = self.cursor.read();

        self.available_from(&cursor)
            .iter()
            .any(|candidate| candidate.kind() == signal.kind())
    }

    /// One representative signal per kind that could currently fire a
    /// transition, guard-checked across the current vertex and all of
    /// its ancestors.
    pub fn available_signals(&self) -> Vec<Arc<dyn Signal>> {
        let cursor = self.cursor.read();
        self.available_from(&cursor)
    }

    /// A serializable projection of the machine's position and
    /// histories, suitable for [`MachineBuilder::restore`](crate::builder::MachineBuilder::restore).
    pub fn snapshot(&self) -> Snapshot {
        let cursor = self.cursor.read();

        Snapshot {
            state_id: self.vertices[cursor.current].id().to_owned(),
            is_final: self.vertices[cursor.current].is_final(),
            signals_history: cursor.signals_history.clone(),
            states_history: cursor.states_history.clone(),
        }
    }

    /// Read access to the extended state. The guard blocks `signal`
    /// calls for as long as it is held.
    pub fn context(&self) -> MappedRwLockReadGuard<'_, C> {
        RwLockReadGuard::map(self.cursor.read(), |cursor| &cursor.context)
    }

    pub(crate) fn vertices(&self) -> &[Vertex<C>] {
        &self.vertices
    }

    pub(crate) fn error_index(&self) -> usize {
        self.error_state
    }

    pub(crate) fn read_cursor(&self) -> RwLockReadGuard<'_, Cursor<C>> {
        self.cursor.read()
    }

    /// Force-set position and histories from a snapshot, then run one
    /// auto-progress pass. The override itself runs no guard, entry, or
    /// exit logic.
    pub(crate) fn rehydrate(&self, snapshot: Snapshot) -> Result<(), BuildError> {
        let target = *self
            .index
            .get(&snapshot.state_id)
            .ok_or_else(|| BuildError::UnknownSnapshotState(snapshot.state_id.clone()))?;

        let mut cursor = self.cursor.write();
        cursor.current = target;
        cursor.signals_history = snapshot.signals_history;
        cursor.states_history = snapshot.states_history;

        self.try_progress(&mut cursor)?;

        Ok(())
    }

    /// Resolve pending epsilon transitions before accepting an external
    /// signal; this is how start, choice, and entry pseudo-states
    /// advance without waiting for an event.
    fn try_progress(&self, cursor: &mut Cursor<C>) -> Result<(), SignalError> {
        if !self.vertices[cursor.current].edges().by_signal(None).is_empty() {
            return self.apply(cursor, None);
        }

        Ok(())
    }

    fn apply(&self, cursor: &mut Cursor<C>, signal: Option<&dyn Signal>) -> Result<(), SignalError> {
        let kind = signal.map(Signal::kind);
        let mut search = Some(cursor.current);

        while let Some(from) = search {
            let vertex = &self.vertices[from];

            let Some(transition) = self.select(vertex, kind, &cursor.context) else {
                // Unhandled here; delegate to the enclosing state.
                trace!(
                    machine = %self.name,
                    state = vertex.id(),
                    "no matching transition, bubbling to parent"
                );
                search = vertex.parent_index();
                continue;
            };

            let Some(target) = transition.target_index() else {
                self.go_to_error_state(cursor, signal);
                return Err(SignalError::UnresolvedTarget {
                    machine: self.name.clone(),
                    state: vertex.id().to_owned(),
                });
            };

            return match transition.kind() {
                TransitionKind::Internal => self.internal_transition(cursor, transition, signal),
                TransitionKind::Normal => {
                    self.normal_transition(cursor, target, transition, signal)
                }
            };
        }

        Err(SignalError::NoTransition {
            machine: self.name.clone(),
            state: self.vertices[cursor.current].id().to_owned(),
            signal: kind.unwrap_or(EPSILON).to_owned(),
        })
    }

    /// First candidate for the signal kind whose guard (if any) holds.
    /// Guarded candidates come first in the edge index, so the
    /// unconditional default only fires when every guard failed.
    fn select<'a>(
        &self,
        vertex: &'a Vertex<C>,
        kind: Option<&str>,
        context: &C,
    ) -> Option<&'a Transition<C>> {
        vertex
            .edges()
            .by_signal(kind)
            .iter()
            .find(|transition| transition.guard().is_none_or(|guard| guard.check(context)))
    }

    fn internal_transition(
        &self,
        cursor: &mut Cursor<C>,
        transition: &Transition<C>,
        signal: Option<&dyn Signal>,
    ) -> Result<(), SignalError> {
        let current = cursor.current;

        if let Some(effect) = transition.effect() {
            self.run_callable(cursor, effect, signal, current)?;
        }

        cursor
            .signals_history
            .push(history_kind(signal).to_owned());

        Ok(())
    }

    fn normal_transition(
        &self,
        cursor: &mut Cursor<C>,
        target: usize,
        transition: &Transition<C>,
        signal: Option<&dyn Signal>,
    ) -> Result<(), SignalError> {
        // If the target is a composite state, step down through entry
        // pseudo-states until a vertex without one is found.
        let mut landing = target;
        while let Some(entry) = self.vertices[landing].entry_index() {
            landing = entry;
        }

        let current = cursor.current;
        let current_parent = self.vertices[current].parent_index();
        let landing_parent = self.vertices[landing].parent_index();

        // Exit actions run only when the current vertex is actually
        // left.
        if landing != current {
            if let Some(action) = self.vertices[current].exit_action() {
                self.run_callable(cursor, action, signal, current)?;
            }
        }

        // Exit the enclosing state too, unless the landing vertex stays
        // under the same parent.
        if let Some(parent) = current_parent {
            if landing_parent != current_parent {
                if let Some(action) = self.vertices[parent].exit_action() {
                    self.run_callable(cursor, action, signal, parent)?;
                }
            }
        }

        if let Some(effect) = transition.effect() {
            self.run_callable(cursor, effect, signal, current)?;
        }

        if let Some(parent) = landing_parent {
            if landing_parent != current_parent {
                if let Some(action) = self.vertices[parent].entry_action() {
                    self.run_callable(cursor, action, signal, parent)?;
                }
            }
        }

        if let Some(action) = self.vertices[landing].entry_action() {
            self.run_callable(cursor, action, signal, landing)?;
        }

        self.commit(cursor, landing, true);

        debug!(
            machine = %self.name,
            state = self.vertices[landing].id(),
            "transition committed"
        );

        if cursor.current == self.error_state {
            return Err(SignalError::ErrorStateReached {
                machine: self.name.clone(),
            });
        }

        cursor
            .signals_history
            .push(history_kind(signal).to_owned());

        // Choice pseudo-states and further epsilon transitions resolve
        // before control returns to the caller.
        let landed = &self.vertices[cursor.current];
        if landed.kind() == VertexKind::Choice || !landed.edges().by_signal(None).is_empty() {
            return self.apply(cursor, None);
        }

        Ok(())
    }

    fn run_callable(
        &self,
        cursor: &mut Cursor<C>,
        callable: &Action<C>,
        signal: Option<&dyn Signal>,
        vertex: usize,
    ) -> Result<(), SignalError> {
        if let Err(source) = callable.run(&mut cursor.context, signal) {
            self.go_to_error_state(cursor, signal);

            return Err(SignalError::ActionFailed {
                label: callable.label().to_owned(),
                state: self.vertices[vertex].id().to_owned(),
                source,
            });
        }

        Ok(())
    }

    /// Force-commit the error vertex. Its entry action runs best-effort:
    /// a secondary failure is swallowed so escalation always completes.
    fn go_to_error_state(&self, cursor: &mut Cursor<C>, signal: Option<&dyn Signal>) {
        warn!(machine = %self.name, "escalating to error state");

        self.commit(cursor, self.error_state, true);

        if let Some(action) = self.vertices[self.error_state].entry_action() {
            if let Err(err) = action.run(&mut cursor.context, signal) {
                warn!(
                    machine = %self.name,
                    error = %err,
                    "error state entry action failed, swallowing"
                );
            }
        }
    }

    /// The only place the machine position changes.
    fn commit(&self, cursor: &mut Cursor<C>, vertex: usize, log: bool) {
        if log {
            cursor
                .states_history
                .push(self.vertices[vertex].id().to_owned());
        }

        cursor.current = vertex;
    }

    fn available_from(&self, cursor: &Cursor<C>) -> Vec<Arc<dyn Signal>> {
        let mut kinds: HashMap<String, Arc<dyn Signal>> = HashMap::new();
        let mut search = Some(cursor.current);

        while let Some(from) = search {
            let vertex = &self.vertices[from];

            for transition in vertex.edges().iter() {
                // Epsilon transitions fire on their own and cannot be
                // signaled from the outside.
                let Some(signal) = transition.signal() else {
                    continue;
                };

                if transition
                    .guard()
                    .is_none_or(|guard| guard.check(&cursor.context))
                {
                    kinds
                        .entry(signal.kind().to_owned())
                        .or_insert_with(|| Arc::clone(signal));
                }
            }

            search = vertex.parent_index();
        }

        kinds.into_values().collect()
    }
}

fn history_kind(signal: Option<&dyn Signal>) -> &str {
    signal.map_or(EPSILON, Signal::kind)
}
