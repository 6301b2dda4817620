//! Guards, actions, and effects: the labelled callables a host attaches
//! to its state graph.
//!
//! A guard is a pure predicate over the machine context used to select
//! among competing transitions. An action is a fallible callable invoked
//! on vertex entry/exit; an effect is the same shape attached to a
//! transition. Labels are mandatory (the validator rejects empty ones)
//! and are what diagnostics and diagram rendering show.

use super::signal::Signal;

/// Error type surfaced by a failing action or effect.
///
/// Hosts may return any error; the engine wraps it into
/// [`SignalError::ActionFailed`](crate::machine::SignalError) and parks
/// the machine in its error vertex.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

type ActionFn<C> = Box<dyn Fn(&mut C, Option<&dyn Signal>) -> Result<(), ActionError> + Send + Sync>;

/// Pure predicate that gates a transition.
///
/// Guards must be side-effect free, at least with respect to anything
/// another guard evaluated in the same dispatch pass could observe.
///
/// # Example
///
/// ```rust
/// use statechart::Guard;
///
/// struct Lobby {
///     players: usize,
/// }
///
/// let enough = Guard::new("players >= 2", |lobby: &Lobby| lobby.players >= 2);
///
/// assert!(!enough.check(&Lobby { players: 1 }));
/// assert!(enough.check(&Lobby { players: 2 }));
/// assert_eq!(enough.label(), "players >= 2");
/// ```
pub struct Guard<C> {
    label: String,
    predicate: Box<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    /// Create a guard from a label and a pure predicate.
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Human-readable representation, shown in diagrams and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Evaluate the predicate against the machine context.
    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }
}

/// Fallible callable run on vertex entry or exit.
///
/// The callable receives the machine context and the signal that caused
/// the transition (`None` when the machine advanced through a
/// pseudo-state on its own).
///
/// # Example
///
/// ```rust
/// use statechart::Action;
///
/// #[derive(Default)]
/// struct Door {
///     log: Vec<String>,
/// }
///
/// let on_entry = Action::new("log(entering)", |door: &mut Door, _signal| {
///     door.log.push("entering".to_owned());
///     Ok(())
/// });
///
/// let mut door = Door::default();
/// assert!(on_entry.run(&mut door, None).is_ok());
/// assert_eq!(door.log, vec!["entering"]);
/// ```
pub struct Action<C> {
    label: String,
    method: ActionFn<C>,
}

impl<C> Action<C> {
    /// Create an action from a label and a callable.
    pub fn new<F>(label: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut C, Option<&dyn Signal>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Action {
            label: label.into(),
            method: Box::new(method),
        }
    }

    /// Human-readable representation, shown in diagrams and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invoke the callable.
    pub fn run(&self, context: &mut C, signal: Option<&dyn Signal>) -> Result<(), ActionError> {
        (self.method)(context, signal)
    }
}

/// Context mutation attached to a transition. Same shape as [`Action`],
/// kept as a distinct name to match statechart vocabulary.
pub type Effect<C> = Action<C>;
