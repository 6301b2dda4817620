//! Transitions between vertices.
//!
//! A transition is declared against a symbolic target id; the machine
//! builder resolves it to a direct vertex reference exactly once, at
//! build time. Internal transitions never leave their owning vertex and
//! are rewritten by the builder to target it.

use std::sync::Arc;

use super::action::{Effect, Guard};
use super::signal::Signal;

/// Whether a transition changes the machine position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Moves the machine to the target vertex, running exit/entry logic.
    Normal,
    /// Runs its effect in place; no exit/entry logic, position unchanged.
    Internal,
}

/// A guarded, effectful edge of the state graph.
///
/// # Example
///
/// ```rust
/// use statechart::{Guard, Signal, Transition};
///
/// struct Keys;
///
/// impl Signal for Keys {
///     fn kind(&self) -> &str {
///         "keys"
///     }
/// }
///
/// let transition: Transition<()> = Transition::to("locked")
///     .on(Keys)
///     .guarded_by(Guard::new("always", |_| true));
///
/// assert_eq!(transition.signal_kind(), Some("keys"));
/// assert_eq!(transition.target_id(), Some("locked"));
/// ```
pub struct Transition<C> {
    kind: TransitionKind,
    signal: Option<Arc<dyn Signal>>,
    guard: Option<Guard<C>>,
    effect: Option<Effect<C>>,
    target_id: Option<String>,
    target: Option<usize>,
}

impl<C> Transition<C> {
    /// Start a normal transition towards the vertex with the given id.
    pub fn to(target: impl Into<String>) -> Self {
        let target = target.into();

        Transition {
            kind: TransitionKind::Normal,
            signal: None,
            guard: None,
            effect: None,
            target_id: (!target.is_empty()).then_some(target),
            target: None,
        }
    }

    /// Start an internal transition; the builder points it back at its
    /// owning vertex.
    pub fn internal() -> Self {
        Transition {
            kind: TransitionKind::Internal,
            signal: None,
            guard: None,
            effect: None,
            target_id: None,
            target: None,
        }
    }

    /// Set the signal that activates this transition. Transitions
    /// without a signal are unconditional (epsilon) and are taken
    /// automatically once their source vertex is reached.
    pub fn on(mut self, signal: impl Signal + 'static) -> Self {
        self.signal = Some(Arc::new(signal));
        self
    }

    /// Gate this transition behind a guard.
    pub fn guarded_by(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach an effect, run when the transition fires.
    pub fn with_effect(mut self, effect: Effect<C>) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The transition kind.
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Run-time kind of the activating signal, `None` for epsilon.
    pub fn signal_kind(&self) -> Option<&str> {
        self.signal.as_deref().map(Signal::kind)
    }

    /// The activating signal value, if any.
    pub fn signal(&self) -> Option<&Arc<dyn Signal>> {
        self.signal.as_ref()
    }

    /// The guard, if any.
    pub fn guard(&self) -> Option<&Guard<C>> {
        self.guard.as_ref()
    }

    /// The effect, if any.
    pub fn effect(&self) -> Option<&Effect<C>> {
        self.effect.as_ref()
    }

    /// Symbolic target id, as declared by the host.
    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub(crate) fn target_index(&self) -> Option<usize> {
        self.target
    }

    pub(crate) fn resolve(&mut self, target_id: String, target: usize) {
        self.target_id = Some(target_id);
        self.target = Some(target);
    }
}
