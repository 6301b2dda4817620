//! PlantUML plain-text notation renderer.

use std::fmt::Write;

use super::Renderer;
use crate::core::transition::{Transition, TransitionKind};
use crate::core::vertex::{Vertex, VertexKind};
use crate::machine::Machine;

/// Renders a machine as a PlantUML state diagram.
///
/// Transitions that could fire right now (owned by the current vertex,
/// guard satisfied against the live context) are highlighted green.
///
/// # Example
///
/// ```rust
/// use statechart::{MachineBuilder, PlantUml, Renderer, Signal, Transition, Vertex};
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
/// let diagram = PlantUml.render(&machine);
/// assert!(diagram.starts_with("@startuml"));
/// ```
pub struct PlantUml;

impl<C> Renderer<C> for PlantUml {
    fn render(&self, machine: &Machine<C>) -> String {
        let cursor = machine.read_cursor();
        let vertices = machine.vertices();

        let order = display_order(vertices, machine.error_index());
        let mut pass = Pass {
            vertices,
            order: order.clone(),
            current: cursor.current,
            context: &cursor.context,
            final_arrows: Vec::new(),
        };

        let caption = format!(
            "caption HSM {}@{}\n",
            machine.name(),
            vertices[cursor.current].id()
        );

        let mut body = String::new();
        for &i in &order {
            if vertices[i].parent_index().is_none() {
                body.push_str(&pass.render_vertex(i));
            }
        }

        // Arrows into final states go at the very end so PlantUML draws
        // the terminal marker last.
        let finals = pass.final_arrows.join("");

        format!("@startuml\n{caption}\n{body}\n{finals}\n@enduml")
    }
}

struct Pass<'a, C> {
    vertices: &'a [Vertex<C>],
    order: Vec<usize>,
    current: usize,
    context: &'a C,
    final_arrows: Vec<String>,
}

/// Display order groups kinds the way the original notation expects:
/// the error sink first, then routing pseudo-states, then plain states.
fn display_order<C>(vertices: &[Vertex<C>], error: usize) -> Vec<usize> {
    let rank = |kind: VertexKind| match kind {
        VertexKind::Error => 0,
        VertexKind::Choice => 1,
        VertexKind::Entry => 2,
        VertexKind::Start => 3,
        VertexKind::Final => 4,
        VertexKind::State => 5,
    };

    let mut order: Vec<usize> = (0..vertices.len()).collect();
    order.sort_by_key(|&i| (i != error, rank(vertices[i].kind()), i));
    order
}

impl<C> Pass<'_, C> {
    fn render_vertex(&mut self, i: usize) -> String {
        let vertex = &self.vertices[i];
        let alias = self.alias(i);
        let mut content = String::new();

        if let Some(action) = vertex.entry_action() {
            let _ = writeln!(content, "{} : entry / {}", alias, action.label());
        }

        if let Some(action) = vertex.exit_action() {
            let _ = writeln!(content, "{} : exit / {}", alias, action.label());
        }

        for transition in vertex.edges().iter() {
            content.push_str(&self.render_transition(i, transition));
        }

        for &child in &self.children(i) {
            let rendered = self.render_vertex(child);
            content.push_str(&rendered);
        }

        match vertex.kind() {
            VertexKind::Error => format!("state \"{}\" as {} #Red\n{}", vertex.id(), alias, content),
            VertexKind::Choice => format!("state {} <<choice>>\n{}\n", alias, content),
            VertexKind::State => format!("state \"{}\" as {} {{\n{}\n}}\n", vertex.id(), alias, content),
            VertexKind::Entry | VertexKind::Start | VertexKind::Final => format!("{content}\n"),
        }
    }

    fn render_transition(&mut self, from: usize, transition: &Transition<C>) -> String {
        let Some(target) = transition.target_index() else {
            return String::new();
        };

        let from_alias = self.alias(from);
        let to_alias = self.alias(target);
        let mut label = self.transition_label(from, transition);

        let live = from == self.current
            && transition
                .guard()
                .is_none_or(|guard| guard.check(self.context));

        match transition.kind() {
            TransitionKind::Internal => {
                if !label.is_empty() {
                    if live {
                        label = format!("<color:green>{label}");
                    }

                    label = format!(" : {label}");
                }

                format!("{from_alias} {label}\n")
            }
            TransitionKind::Normal => {
                if !label.is_empty() {
                    label = format!(" : {label}");
                }

                let arrow = if live { "-[#green]->" } else { "-->" };
                let line = format!("{from_alias} {arrow} {to_alias}{label}\n");

                if self.vertices[target].kind() == VertexKind::Final {
                    self.final_arrows.push(line);
                    return String::new();
                }

                line
            }
        }
    }

    fn transition_label(&self, from: usize, transition: &Transition<C>) -> String {
        let trigger = transition.signal_kind().unwrap_or("");
        let guard = transition
            .guard()
            .map(|g| format!("[{}]", g.label()))
            .unwrap_or_default();
        let effect = transition
            .effect()
            .map(|e| format!("/ {}", e.label()))
            .unwrap_or_default();

        if self.vertices[from].kind() == VertexKind::Choice
            && trigger.is_empty()
            && guard.is_empty()
            && effect.is_empty()
        {
            return "[else]".to_owned();
        }

        [trigger, &guard, &effect]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn alias(&self, i: usize) -> String {
        match self.vertices[i].kind() {
            VertexKind::Entry | VertexKind::Start | VertexKind::Final => "[*]".to_owned(),
            VertexKind::Choice => format!("choice_{i}"),
            VertexKind::Error => format!("error_{i}"),
            VertexKind::State => format!("state_{i}"),
        }
    }

    fn children(&self, parent: usize) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&i| self.vertices[i].parent_index() == Some(parent))
            .collect()
    }
}
