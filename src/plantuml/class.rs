use std::str::FromStr;

use log::{trace, warn};
use regex::Regex;

use super::{label, pattern, source_lines};
use crate::model::{ClassDiagram, ClassEntity, ClassKind, ClassRelationship, RelationKind, Registry};

/// Line patterns in match priority order.
struct ClassPatterns {
    block: Regex,
    one_line_block: Regex,
    inline: Regex,
    cardinality: Regex,
    inheritance: Regex,
    realization: Regex,
    keyword: Regex,
    association: Regex,
    dependency: Regex,
}

impl ClassPatterns {
    fn new() -> Self {
        Self {
            block: pattern(r"(?i)^(class|interface)\s+(\w+)\s*\{$"),
            one_line_block: pattern(r"(?i)^(class|interface)\s+(\w+)\s*\{(.*)\}$"),
            inline: pattern(r"(?i)^(class|interface)\s+(\w+)$"),
            // Customer "1" --> "0..*" Order : places
            cardinality: pattern(
                r#"^(\w+)(?:\s+"([^"]+)")?\s+([o*\->]+)\s+(?:"([^"]+)"\s+)?(\w+)(?:\s*:\s*(.+))?$"#,
            ),
            inheritance: pattern(r"^(\w+)\s+<\|--\s+(\w+)(?:\s*:\s*(.+))?$"),
            realization: pattern(r"^(\w+)\s+<\|\.\.\s+(\w+)(?:\s*:\s*(.+))?$"),
            keyword: pattern(r"(?i)^(\w+)\s+(extends|implements)\s+(\w+)(?:\s*:\s*(.+))?$"),
            association: pattern(r"^(\w+)\s+-->\s+(\w+)(?:\s*:\s*(.+))?$"),
            dependency: pattern(r"^(\w+)\s+\.\.>\s+(\w+)(?:\s*:\s*(.+))?$"),
        }
    }
}

struct ClassBuilder {
    entities: Registry<ClassEntity>,
    relationships: Vec<ClassRelationship>,
}

impl ClassBuilder {
    fn new() -> Self {
        Self {
            entities: Registry::new(),
            relationships: Vec::new(),
        }
    }

    /// Register an explicit declaration. It replaces an auto-created
    /// placeholder but never a body that was already captured.
    fn declare(&mut self, name: &str, kind: ClassKind, body: String) {
        match self.entities.get_mut(name) {
            Some(existing) if !existing.body.is_empty() => {
                trace!(name; "Keeping first declared body");
            }
            Some(existing) => {
                existing.kind = kind;
                existing.body = body;
            }
            None => self
                .entities
                .insert(name, ClassEntity::new(name, kind).with_body(body)),
        }
    }

    fn ensure(&mut self, name: &str, kind: ClassKind) {
        if self
            .entities
            .insert_if_absent(name, || ClassEntity::new(name, kind))
        {
            trace!(name, kind:?; "Auto-created class entity");
        }
    }

    fn relate(&mut self, relationship: ClassRelationship) {
        let target_kind = if relationship.relation == RelationKind::Implements {
            ClassKind::Interface
        } else {
            ClassKind::Class
        };
        self.ensure(&relationship.source, ClassKind::Class);
        self.ensure(&relationship.target, target_kind);
        self.relationships.push(relationship);
    }

    fn finish(self) -> ClassDiagram {
        ClassDiagram {
            entities: self.entities,
            relationships: self.relationships,
        }
    }
}

/// Parse a PlantUML class diagram.
///
/// Each line is tried against the patterns in priority order and the first
/// match wins. Unrecognized lines are reported through the `log` facade and
/// skipped.
pub fn parse_class(input: &str) -> ClassDiagram {
    let patterns = ClassPatterns::new();
    let lines = source_lines(input);
    let mut builder = ClassBuilder::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        // class Name { ... }
        if let Some(caps) = patterns.block.captures(line) {
            let kind = ClassKind::from_str(&caps[1]).unwrap_or_default();
            let start = i;
            while i < lines.len() && lines[i] != "}" {
                i += 1;
            }
            let body = lines[start..i].join("\n");
            if i < lines.len() {
                i += 1; // closing brace
            } else {
                warn!(name = &caps[2]; "Class body is not closed before end of input");
            }
            builder.declare(&caps[2], kind, body);
            continue;
        }

        // class Name { +int id }
        if let Some(caps) = patterns.one_line_block.captures(line) {
            let kind = ClassKind::from_str(&caps[1]).unwrap_or_default();
            builder.declare(&caps[2], kind, caps[3].trim().to_string());
            continue;
        }

        if let Some(caps) = patterns.inline.captures(line) {
            let kind = ClassKind::from_str(&caps[1]).unwrap_or_default();
            builder.declare(&caps[2], kind, String::new());
            continue;
        }

        if let Some(caps) = patterns.cardinality.captures(line) {
            let mut rel = ClassRelationship::new(&caps[1], &caps[5], RelationKind::Association)
                .with_label(label(&caps, 6).as_deref());
            rel.source_cardinality = caps.get(2).map(|m| m.as_str().to_string());
            rel.arrow = Some(caps[3].to_string());
            rel.target_cardinality = caps.get(4).map(|m| m.as_str().to_string());
            builder.relate(rel);
            continue;
        }

        // Parent <|-- Child
        if let Some(caps) = patterns.inheritance.captures(line) {
            let rel = ClassRelationship::new(&caps[2], &caps[1], RelationKind::Extends);
            builder.relate(rel.with_label(label(&caps, 3).as_deref()));
            continue;
        }

        // Interface <|.. Class
        if let Some(caps) = patterns.realization.captures(line) {
            let rel = ClassRelationship::new(&caps[2], &caps[1], RelationKind::Implements);
            builder.relate(rel.with_label(label(&caps, 3).as_deref()));
            continue;
        }

        if let Some(caps) = patterns.keyword.captures(line) {
            let relation = RelationKind::from_str(&caps[2]).unwrap_or(RelationKind::Other);
            let rel = ClassRelationship::new(&caps[1], &caps[3], relation);
            builder.relate(rel.with_label(label(&caps, 4).as_deref()));
            continue;
        }

        if let Some(caps) = patterns.association.captures(line) {
            let rel = ClassRelationship::new(&caps[1], &caps[2], RelationKind::Association);
            builder.relate(rel.with_label(label(&caps, 3).as_deref()));
            continue;
        }

        if let Some(caps) = patterns.dependency.captures(line) {
            let rel = ClassRelationship::new(&caps[1], &caps[2], RelationKind::Dependency);
            builder.relate(rel.with_label(label(&caps, 3).as_deref()));
            continue;
        }

        warn!(line; "Unparsed class diagram line");
    }

    builder.finish()
}
