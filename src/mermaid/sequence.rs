use std::collections::HashMap;

use log::trace;

use super::MermaidOptions;
use crate::escape::{format_condition, format_name};
use crate::model::{Branch, Event, SequenceDiagram};

/// A rendered output line. Activation lines stay tagged until the
/// deactivation filter has run.
#[derive(Debug, Clone, PartialEq)]
enum Line {
    Text(String),
    Activate(String),
    Deactivate(String),
}

struct EventRenderer<'o> {
    options: &'o MermaidOptions,
    out: Vec<Line>,
}

impl<'o> EventRenderer<'o> {
    fn new(options: &'o MermaidOptions) -> Self {
        Self {
            options,
            out: Vec::new(),
        }
    }

    fn condition(&self, text: &str) -> String {
        if self.options.escape_labels {
            format_condition(text)
        } else {
            text.to_string()
        }
    }

    fn text(&mut self, line: String) {
        self.out.push(Line::Text(line));
    }

    fn render(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::Message(msg) => {
                    let line = format!(
                        "{}->>{}: {}",
                        format_name(&msg.sender),
                        format_name(&msg.receiver),
                        self.options.label(&msg.text)
                    );
                    self.text(line);
                }
                Event::Activate(act) => self.out.push(Line::Activate(format_name(&act.participant))),
                Event::Deactivate(act) => {
                    self.out.push(Line::Deactivate(format_name(&act.participant)))
                }
                Event::Note(note) => {
                    let text = self.options.label(&note.text).into_owned();
                    let line = match &note.participant {
                        Some(participant) => {
                            format!("Note over {}: {}", format_name(participant), text)
                        }
                        None => format!("Note: {}", text),
                    };
                    self.text(line);
                }
                Event::Alt(alt) => self.render_branches("alt", "else", &alt.alternatives),
                Event::Loop(block) => {
                    let header = format!("loop {}", self.condition(&block.condition));
                    self.text(header);
                    self.render(&block.events);
                    self.text("end".to_string());
                }
                Event::Par(par) => self.render_branches("par", "and", &par.branches),
            }
        }
    }

    fn render_branches(&mut self, opener: &str, separator: &str, branches: &[Branch]) {
        for (i, branch) in branches.iter().enumerate() {
            let keyword = if i == 0 { opener } else { separator };
            let header = format!("{} {}", keyword, self.condition(&branch.label));
            self.text(header.trim_end().to_string());
            self.render(&branch.events);
        }
        if !branches.is_empty() {
            self.text("end".to_string());
        }
    }
}

/// Drop every `deactivate` whose participant has no open activation at that
/// point of the flat output. Activation state is tracked in output order,
/// not per block.
fn filter_deactivations(lines: Vec<Line>) -> Vec<String> {
    let mut active: HashMap<String, bool> = HashMap::new();
    let mut result = Vec::with_capacity(lines.len());

    for line in lines {
        match line {
            Line::Text(text) => result.push(text),
            Line::Activate(name) => {
                result.push(format!("activate {}", name));
                active.insert(name, true);
            }
            Line::Deactivate(name) => {
                let open = active.get_mut(&name);
                match open {
                    Some(open) if *open => {
                        *open = false;
                        result.push(format!("deactivate {}", name));
                    }
                    _ => trace!(participant = name; "Dropping dangling deactivate"),
                }
            }
        }
    }

    result
}

/// Generate a Mermaid sequence diagram with default options.
pub fn generate_sequence(diagram: &SequenceDiagram) -> String {
    generate_sequence_with(diagram, &MermaidOptions::default())
}

/// Generate a Mermaid sequence diagram: lifeline declarations, then the
/// rendered event tree with dangling deactivations removed.
pub fn generate_sequence_with(diagram: &SequenceDiagram, options: &MermaidOptions) -> String {
    let mut lines = vec!["sequenceDiagram".to_string()];

    for actor in diagram.actors.values() {
        lines.push(declaration("actor", &actor.name, actor.label.as_deref(), options));
    }
    for participant in diagram.participants.values() {
        lines.push(declaration(
            "participant",
            &participant.name,
            participant.label.as_deref(),
            options,
        ));
    }

    let mut renderer = EventRenderer::new(options);
    renderer.render(&diagram.events);
    lines.extend(filter_deactivations(renderer.out));

    lines.join("\n")
}

fn declaration(keyword: &str, name: &str, label: Option<&str>, options: &MermaidOptions) -> String {
    match label {
        Some(label) if options.participant_labels => {
            format!("{} {} as {}", keyword, format_name(name), options.label(label))
        }
        _ => format!("{} {}", keyword, format_name(name)),
    }
}
