//! Property-based tests for dispatch, choice resolution, error
//! escalation, and snapshot/restore.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use statechart::{
    Action, Guard, Machine, MachineBuilder, Signal, SignalError, Snapshot, Transition, Vertex,
};

struct Handle;

impl Signal for Handle {
    fn kind(&self) -> &str {
        "handle"
    }
}

struct Keys;

impl Signal for Keys {
    fn kind(&self) -> &str {
        "keys"
    }
}

struct Go;

impl Signal for Go {
    fn kind(&self) -> &str {
        "go"
    }
}

/// Door machine: handle toggles open/closed, keys toggles closed/locked.
fn door_builder() -> MachineBuilder<()> {
    MachineBuilder::new()
        .named("door")
        .with_context(())
        .starting_at("open")
        .with_error_state(Vertex::error("error"))
        .add_state(Vertex::state("open").transition(Transition::to("closed").on(Handle)))
        .add_state(
            Vertex::state("closed")
                .transition(Transition::to("open").on(Handle))
                .transition(Transition::to("locked").on(Keys)),
        )
        .add_state(Vertex::state("locked").transition(Transition::to("closed").on(Keys)))
}

fn door() -> Machine<()> {
    match door_builder().build() {
        Ok(machine) => machine,
        Err(err) => panic!("door machine must build: {err}"),
    }
}

/// Reference next-state function for the door machine. `None` means the
/// signal must be rejected without moving.
fn door_step(current: &str, use_handle: bool) -> Option<&'static str> {
    match (current, use_handle) {
        ("open", true) => Some("closed"),
        ("closed", true) => Some("open"),
        ("closed", false) => Some("locked"),
        ("locked", false) => Some("closed"),
        _ => None,
    }
}

proptest! {
    #[test]
    fn door_walk_matches_the_reference_automaton(
        walk in prop::collection::vec(any::<bool>(), 0..20)
    ) {
        let machine = door();
        let mut current = "open".to_owned();
        let mut states = vec!["open".to_owned()];
        let mut signals: Vec<String> = Vec::new();

        for &use_handle in &walk {
            let result = if use_handle {
                machine.signal(&Handle)
            } else {
                machine.signal(&Keys)
            };

            match door_step(&current, use_handle) {
                Some(next) => {
                    prop_assert!(result.is_ok());
                    current = next.to_owned();
                    states.push(next.to_owned());
                    signals.push(if use_handle { "handle" } else { "keys" }.to_owned());
                }
                None => {
                    // Rejected signals leave no trace at all.
                    prop_assert!(
                        matches!(result, Err(SignalError::NoTransition { .. })),
                        "expected Err(SignalError::NoTransition), got {:?}",
                        result
                    );
                }
            }
        }

        let snapshot = machine.snapshot();
        prop_assert_eq!(&snapshot.state_id, &current);
        prop_assert_eq!(snapshot.states_history, states);
        prop_assert_eq!(snapshot.signals_history, signals);
        prop_assert!(!machine.failed());
    }

    #[test]
    fn choice_lands_where_its_guards_point(first in any::<bool>(), second in any::<bool>()) {
        let machine: Machine<(bool, bool)> = MachineBuilder::new()
            .named("fork")
            .with_context((first, second))
            .starting_at("pick")
            .with_error_state(Vertex::error("error"))
            .add_state(Vertex::state("pick").transition(Transition::to("which").on(Go)))
            .add_state(
                Vertex::choice("which")
                    .transition(
                        Transition::to("a")
                            .guarded_by(Guard::new("first", |flags: &(bool, bool)| flags.0)),
                    )
                    .transition(
                        Transition::to("b")
                            .guarded_by(Guard::new("second", |flags: &(bool, bool)| flags.1)),
                    )
                    .transition(Transition::to("fallback")),
            )
            .add_state(Vertex::state("a"))
            .add_state(Vertex::state("b"))
            .add_state(Vertex::state("fallback"))
            .build()
            .unwrap();

        machine.signal(&Go).unwrap();
        let landed = machine.current().id().to_owned();

        if !first && !second {
            prop_assert_eq!(landed, "fallback");
        } else {
            // One branch with a true guard, never the default.
            prop_assert!(landed == "a" || landed == "b");
            prop_assert!(landed != "a" || first);
            prop_assert!(landed != "b" || second);
        }
    }

    #[test]
    fn failed_tracks_the_error_vertex_exactly(explode in any::<bool>()) {
        let machine = MachineBuilder::new()
            .named("maybe")
            .with_context(explode)
            .starting_at("a")
            .with_error_state(Vertex::error("error"))
            .add_state(Vertex::state("a").transition(
                Transition::to("b").on(Go).with_effect(Action::new(
                    "explode if armed",
                    |armed: &mut bool, _| {
                        if *armed {
                            Err("boom".into())
                        } else {
                            Ok(())
                        }
                    },
                )),
            ))
            .add_state(Vertex::state("b"))
            .build()
            .unwrap();

        let result = machine.signal(&Go);

        prop_assert_eq!(result.is_err(), explode);
        prop_assert_eq!(machine.failed(), explode);
        prop_assert_eq!(machine.at("error"), explode);
        prop_assert_eq!(machine.at("b"), !explode);
    }

    #[test]
    fn restore_reproduces_the_walked_machine(
        walk in prop::collection::vec(any::<bool>(), 0..12)
    ) {
        let machine = door();
        for &use_handle in &walk {
            let _ = if use_handle {
                machine.signal(&Handle)
            } else {
                machine.signal(&Keys)
            };
        }

        let snapshot = machine.snapshot();
        let revived = door_builder().restore(snapshot.clone()).unwrap();

        prop_assert_eq!(revived.snapshot(), snapshot);
        prop_assert_eq!(revived.current().id(), machine.current().id());
        prop_assert_eq!(revived.failed(), machine.failed());
        prop_assert_eq!(revived.finished(), machine.finished());
    }

    #[test]
    fn every_available_signal_can_fire(
        walk in prop::collection::vec(any::<bool>(), 0..12)
    ) {
        let machine = door();
        for &use_handle in &walk {
            let _ = if use_handle {
                machine.signal(&Handle)
            } else {
                machine.signal(&Keys)
            };
        }

        for signal in machine.available_signals() {
            prop_assert!(machine.can(signal.as_ref()));
        }
    }

    #[test]
    fn snapshot_codecs_round_trip(
        state_id in "[a-z]{1,12}",
        is_final in any::<bool>(),
        signals in prop::collection::vec("[a-z]{1,8}", 0..8),
        states in prop::collection::vec("[a-z]{1,8}", 0..8),
    ) {
        let snapshot = Snapshot {
            state_id,
            is_final,
            signals_history: signals,
            states_history: states,
        };

        let json = snapshot.to_json().unwrap();
        prop_assert_eq!(&Snapshot::from_json(&json).unwrap(), &snapshot);

        let bytes = snapshot.to_bytes().unwrap();
        prop_assert_eq!(&Snapshot::from_bytes(&bytes).unwrap(), &snapshot);
    }
}
