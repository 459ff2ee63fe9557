use log::{debug, trace, warn};
use regex::Regex;

use super::{pattern, source_lines};
use crate::model::{
    Activation, Actor, AltBlock, Branch, Event, LoopBlock, Message, Note, ParBlock, Participant,
    Registry, SequenceDiagram,
};

struct SequencePatterns {
    actor_alias: Regex,
    actor: Regex,
    participant_alias: Regex,
    participant: Regex,
    declaration: Regex,
    message: Regex,
    activate: Regex,
    deactivate: Regex,
    note: Regex,
}

impl SequencePatterns {
    fn new() -> Self {
        Self {
            actor_alias: pattern(r#"(?i)^actor\s+"([^"]+)"\s+as\s+(\w+)$"#),
            actor: pattern(r"(?i)^actor\s+(\w+)$"),
            participant_alias: pattern(r#"(?i)^participant\s+"([^"]+)"\s+as\s+(\w+)$"#),
            participant: pattern(r"(?i)^participant\s+(\w+)$"),
            declaration: pattern(r"(?i)^(actor|participant)\s+"),
            message: pattern(r"^(\w+)\s*--?>>?\s*(\w+)\s*:\s*(.+)$"),
            activate: pattern(r"(?i)^activate\s+(\w+)$"),
            deactivate: pattern(r"(?i)^deactivate\s+(\w+)$"),
            note: pattern(r"(?i)^note\b(?:\s+(?:over|left of|right of))?\s*(\w+)?\s*:\s*(.+)$"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Control {
    Alt,
    Else,
    Loop,
    Par,
    And,
    End,
}

const CONTROL_WORDS: &[(&str, Control)] = &[
    ("alt", Control::Alt),
    ("else", Control::Else),
    ("loop", Control::Loop),
    ("par", Control::Par),
    ("and", Control::And),
    ("end", Control::End),
];

/// Match a control keyword as the whole first word of `line`, returning the
/// keyword and the trimmed remainder (condition or label).
fn control(line: &str) -> Option<(Control, &str)> {
    for (word, control) in CONTROL_WORDS {
        let Some(head) = line.get(..word.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(word) {
            continue;
        }
        let rest = &line[word.len()..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let rest = rest.trim();
        // `end note`, `end box` and friends close constructs this parser does not model
        if *control == Control::End
            && !rest.is_empty()
            && !["alt", "loop", "par"].iter().any(|k| rest.eq_ignore_ascii_case(k))
        {
            return None;
        }
        return Some((*control, rest));
    }
    None
}

/// Why an event list stopped. The terminating line is left unconsumed so
/// the enclosing block can decide what it means.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stop<'a> {
    End,
    Else(&'a str),
    And(&'a str),
    Eof,
}

struct EventReader<'a> {
    patterns: &'a SequencePatterns,
    lines: &'a [&'a str],
    pos: usize,
}

impl<'a> EventReader<'a> {
    fn new(patterns: &'a SequencePatterns, lines: &'a [&'a str]) -> Self {
        Self {
            patterns,
            lines,
            pos: 0,
        }
    }

    fn read_document(&mut self) -> Vec<Event> {
        let (events, stop) = self.read_events(0);
        debug_assert_eq!(stop, Stop::Eof);
        events
    }

    fn read_events(&mut self, depth: usize) -> (Vec<Event>, Stop<'a>) {
        let mut events = Vec::new();

        while let Some(&line) = self.lines.get(self.pos) {
            if let Some(event) = self.read_simple(line) {
                events.push(event);
                self.pos += 1;
                continue;
            }

            let Some((control, rest)) = control(line) else {
                debug!(line; "Skipping unrecognized sequence diagram line");
                self.pos += 1;
                continue;
            };

            let stop = match control {
                Control::Alt => {
                    self.pos += 1;
                    events.push(self.read_alt(rest, depth));
                    continue;
                }
                Control::Loop => {
                    self.pos += 1;
                    events.push(self.read_loop(rest, depth));
                    continue;
                }
                Control::Par => {
                    self.pos += 1;
                    events.push(self.read_par(rest, depth));
                    continue;
                }
                Control::End => Stop::End,
                Control::Else => Stop::Else(rest),
                Control::And => Stop::And(rest),
            };

            if depth == 0 {
                warn!(line; "Ignoring block terminator outside of any block");
                self.pos += 1;
                continue;
            }
            return (events, stop);
        }

        (events, Stop::Eof)
    }

    fn read_simple(&self, line: &str) -> Option<Event> {
        let p = self.patterns;

        if let Some(caps) = p.message.captures(line) {
            return Some(Event::Message(Message {
                sender: caps[1].to_string(),
                receiver: caps[2].to_string(),
                text: caps[3].trim().to_string(),
            }));
        }
        if let Some(caps) = p.activate.captures(line) {
            return Some(Event::Activate(Activation {
                participant: caps[1].to_string(),
            }));
        }
        if let Some(caps) = p.deactivate.captures(line) {
            return Some(Event::Deactivate(Activation {
                participant: caps[1].to_string(),
            }));
        }
        if let Some(caps) = p.note.captures(line) {
            return Some(Event::Note(Note {
                participant: caps.get(1).map(|m| m.as_str().to_string()),
                text: caps[2].trim().to_string(),
            }));
        }
        None
    }

    fn read_alt(&mut self, condition: &str, depth: usize) -> Event {
        let mut alternatives = Vec::new();
        let mut label = condition.to_string();

        loop {
            let (events, stop) = self.read_events(depth + 1);
            alternatives.push(Branch { label, events });
            match stop {
                Stop::Else(next) => {
                    self.pos += 1;
                    label = next.to_string();
                }
                Stop::End => {
                    self.pos += 1;
                    break;
                }
                Stop::And(_) => {
                    warn!(depth; "`and` closes an open alt block");
                    break;
                }
                Stop::Eof => {
                    warn!(depth; "alt block not closed before end of input");
                    break;
                }
            }
        }

        Event::Alt(AltBlock { alternatives })
    }

    fn read_loop(&mut self, condition: &str, depth: usize) -> Event {
        let (events, stop) = self.read_events(depth + 1);
        match stop {
            Stop::End => self.pos += 1,
            Stop::Else(_) | Stop::And(_) => {
                warn!(depth; "loop block closed by an enclosing block's branch");
            }
            Stop::Eof => warn!(depth; "loop block not closed before end of input"),
        }

        Event::Loop(LoopBlock {
            condition: condition.to_string(),
            events,
        })
    }

    fn read_par(&mut self, label: &str, depth: usize) -> Event {
        let mut branches = Vec::new();
        let mut label = label.to_string();

        loop {
            let (events, stop) = self.read_events(depth + 1);
            branches.push(Branch { label, events });
            match stop {
                Stop::And(next) => {
                    self.pos += 1;
                    label = next.to_string();
                }
                Stop::End => {
                    self.pos += 1;
                    break;
                }
                Stop::Else(_) => {
                    warn!(depth; "`else` closes an open par block");
                    break;
                }
                Stop::Eof => {
                    warn!(depth; "par block not closed before end of input");
                    break;
                }
            }
        }

        Event::Par(ParBlock { branches })
    }
}

/// Every lifeline name referenced by `events`, recursively, in first-use order.
fn lifeline_refs<'e>(events: &'e [Event], out: &mut Vec<&'e str>) {
    for event in events {
        match event {
            Event::Message(msg) => {
                out.push(&msg.sender);
                out.push(&msg.receiver);
            }
            Event::Activate(act) | Event::Deactivate(act) => out.push(&act.participant),
            Event::Note(note) => {
                if let Some(participant) = &note.participant {
                    out.push(participant);
                }
            }
            Event::Alt(alt) => {
                for branch in &alt.alternatives {
                    lifeline_refs(&branch.events, out);
                }
            }
            Event::Loop(block) => lifeline_refs(&block.events, out),
            Event::Par(par) => {
                for branch in &par.branches {
                    lifeline_refs(&branch.events, out);
                }
            }
        }
    }
}

/// Parse a PlantUML sequence diagram.
///
/// Declarations are collected in a first pass and removed from the event
/// stream; events are then read by recursive descent over `alt`/`loop`/`par`
/// blocks. Lifelines used without a declaration are registered as
/// participants afterwards.
pub fn parse_sequence(input: &str) -> SequenceDiagram {
    let patterns = SequencePatterns::new();
    let lines = source_lines(input);

    let mut actors: Registry<Actor> = Registry::new();
    let mut participants: Registry<Participant> = Registry::new();

    for line in &lines {
        if let Some(caps) = patterns.actor_alias.captures(line) {
            let alias = &caps[2];
            actors.insert(
                alias,
                Actor {
                    name: alias.to_string(),
                    label: Some(caps[1].to_string()),
                },
            );
        } else if let Some(caps) = patterns.actor.captures(line) {
            let name = &caps[1];
            actors.insert(
                name,
                Actor {
                    name: name.to_string(),
                    label: None,
                },
            );
        } else if let Some(caps) = patterns.participant_alias.captures(line) {
            let alias = &caps[2];
            participants.insert(
                alias,
                Participant {
                    name: alias.to_string(),
                    label: Some(caps[1].to_string()),
                },
            );
        } else if let Some(caps) = patterns.participant.captures(line) {
            participants.insert(&caps[1], Participant::named(&caps[1]));
        }
    }

    let event_lines: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| !patterns.declaration.is_match(line))
        .collect();
    let events = EventReader::new(&patterns, &event_lines).read_document();

    let mut referenced = Vec::new();
    lifeline_refs(&events, &mut referenced);
    for name in referenced {
        if actors.contains(name) {
            continue;
        }
        if participants.insert_if_absent(name, || Participant::named(name)) {
            trace!(name; "Auto-registered participant");
        }
    }

    SequenceDiagram {
        actors,
        participants,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<T>(registry: &Registry<T>) -> Vec<&str> {
        registry.keys().collect()
    }

    #[test]
    fn test_parse_declarations_and_messages() {
        let input = r#"
@startuml
actor User
participant "Mobile App" as App
User -> App: Login
App ->> User: Welcome
@enduml
"#;
        let diagram = parse_sequence(input);
        assert_eq!(names(&diagram.actors), vec!["User"]);
        assert_eq!(names(&diagram.participants), vec!["App"]);
        assert_eq!(
            diagram.participants.get("App").unwrap().label.as_deref(),
            Some("Mobile App")
        );

        assert_eq!(diagram.events.len(), 2);
        if let Event::Message(msg) = &diagram.events[0] {
            assert_eq!(msg.sender, "User");
            assert_eq!(msg.receiver, "App");
            assert_eq!(msg.text, "Login");
        } else {
            panic!("Expected message");
        }
        assert!(matches!(&diagram.events[1], Event::Message(m) if m.text == "Welcome"));
    }

    #[test]
    fn test_undeclared_lifelines_become_participants() {
        let input = r#"
actor User
User -> Api: call
alt ok
    activate Db
    note over Cache: warm
else
    loop retry
        Api -> Queue: push
    end
end
"#;
        let diagram = parse_sequence(input);
        assert_eq!(names(&diagram.actors), vec!["User"]);
        assert_eq!(
            names(&diagram.participants),
            vec!["Api", "Db", "Cache", "Queue"]
        );
    }

    #[test]
    fn test_parse_activation_and_notes() {
        let input = "activate A\nnote left of A: thinking\nnote: done\ndeactivate A";
        let diagram = parse_sequence(input);
        assert_eq!(diagram.events.len(), 4);
        assert!(matches!(&diagram.events[0], Event::Activate(a) if a.participant == "A"));
        if let Event::Note(note) = &diagram.events[1] {
            assert_eq!(note.participant.as_deref(), Some("A"));
            assert_eq!(note.text, "thinking");
        } else {
            panic!("Expected note");
        }
        if let Event::Note(note) = &diagram.events[2] {
            assert_eq!(note.participant, None);
            assert_eq!(note.text, "done");
        } else {
            panic!("Expected note");
        }
        assert!(matches!(&diagram.events[3], Event::Deactivate(a) if a.participant == "A"));
    }

    #[test]
    fn test_parse_alt_with_else_branches() {
        let input = r#"
alt Valid
    A -> B: ok
else Expired
    A -> B: renew
else
    A -> B: fail
end
A -> B: after
"#;
        let diagram = parse_sequence(input);
        assert_eq!(diagram.events.len(), 2);
        if let Event::Alt(alt) = &diagram.events[0] {
            let labels: Vec<&str> = alt.alternatives.iter().map(|b| b.label.as_str()).collect();
            assert_eq!(labels, vec!["Valid", "Expired", ""]);
            assert!(alt.alternatives.iter().all(|b| b.events.len() == 1));
        } else {
            panic!("Expected alt block");
        }
    }

    #[test]
    fn test_nested_alt_end_does_not_close_parent() {
        let input = r#"
alt outer
    alt inner
        A -> B: one
    end
end
A -> B: two
"#;
        let diagram = parse_sequence(input);
        assert_eq!(diagram.events.len(), 2);
        if let Event::Alt(outer) = &diagram.events[0] {
            assert_eq!(outer.alternatives.len(), 1);
            assert_eq!(outer.alternatives[0].label, "outer");
            assert!(matches!(&outer.alternatives[0].events[0], Event::Alt(_)));
        } else {
            panic!("Expected alt block");
        }
        assert!(matches!(&diagram.events[1], Event::Message(m) if m.text == "two"));
    }

    #[test]
    fn test_parse_loop_and_par() {
        let input = r#"
loop every second
    A -> B: ping
end
par first
    A -> B: x
and second
    A -> C: y
and third
    A -> D: z
end
"#;
        let diagram = parse_sequence(input);
        assert_eq!(diagram.events.len(), 2);
        if let Event::Loop(block) = &diagram.events[0] {
            assert_eq!(block.condition, "every second");
            assert_eq!(block.events.len(), 1);
        } else {
            panic!("Expected loop block");
        }
        if let Event::Par(par) = &diagram.events[1] {
            let labels: Vec<&str> = par.branches.iter().map(|b| b.label.as_str()).collect();
            assert_eq!(labels, vec!["first", "second", "third"]);
        } else {
            panic!("Expected par block");
        }
    }

    #[test]
    fn test_else_closes_nested_loop() {
        let input = "alt a\nloop l\nA -> B: x\nelse b\nA -> B: y\nend";
        let diagram = parse_sequence(input);
        assert_eq!(diagram.events.len(), 1);
        if let Event::Alt(alt) = &diagram.events[0] {
            assert_eq!(alt.alternatives.len(), 2);
            assert!(matches!(&alt.alternatives[0].events[0], Event::Loop(l) if l.events.len() == 1));
            assert_eq!(alt.alternatives[1].label, "b");
        } else {
            panic!("Expected alt block");
        }
    }

    #[test]
    fn test_unclosed_block_closes_at_end_of_input() {
        let diagram = parse_sequence("alt open\nA -> B: x\nelse other\nA -> B: y");
        if let Event::Alt(alt) = &diagram.events[0] {
            assert_eq!(alt.alternatives.len(), 2);
        } else {
            panic!("Expected alt block");
        }
    }

    #[test]
    fn test_stray_end_at_top_level_is_skipped() {
        let diagram = parse_sequence("A -> B: one\nend\nA -> B: two");
        assert_eq!(diagram.events.len(), 2);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let diagram = parse_sequence("andy -> alternate: hi\nending -> loopback: yo");
        assert_eq!(diagram.events.len(), 2);
        assert!(diagram.events.iter().all(|e| matches!(e, Event::Message(_))));
        assert_eq!(
            names(&diagram.participants),
            vec!["andy", "alternate", "ending", "loopback"]
        );
    }

    #[test]
    fn test_end_note_is_not_a_block_end() {
        let diagram = parse_sequence("loop l\nA -> B: x\nend note\nA -> B: y\nend");
        assert_eq!(diagram.events.len(), 1);
        if let Event::Loop(block) = &diagram.events[0] {
            assert_eq!(block.events.len(), 2);
        } else {
            panic!("Expected loop block");
        }
    }

    #[test]
    fn test_unrecognized_declaration_forms_are_dropped() {
        let diagram = parse_sequence("participant \"No Alias\"\nA -> B: x");
        assert_eq!(names(&diagram.participants), vec!["A", "B"]);
        assert_eq!(diagram.events.len(), 1);
    }
}
