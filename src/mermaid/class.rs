use regex::Regex;

use super::MermaidOptions;
use crate::model::{ClassDiagram, ClassEntity, ClassRelationship, RelationKind};
use crate::plantuml::pattern;

const DEFAULT_ARROW: &str = "-->";

/// Normalizes PlantUML member lines into Mermaid member syntax.
struct BodyRewriter {
    method_keyword: Regex,
    return_colon: Regex,
}

impl BodyRewriter {
    fn new() -> Self {
        Self {
            method_keyword: pattern(r"^([+-])\s*fun\s+"),
            return_colon: pattern(r"\)\s*:"),
        }
    }

    fn rewrite(&self, line: &str) -> String {
        let line = self.method_keyword.replace(line.trim(), "${1} ");
        self.return_colon.replace_all(&line, ")").into_owned()
    }
}

/// Rewrite one class body line: `+fun save(x: T): Boolean` becomes
/// `+ save(x: T) Boolean`. Generation reuses one rewriter for every body
/// line; this entry point compiles its own.
pub fn process_body_line(line: &str) -> String {
    BodyRewriter::new().rewrite(line)
}

/// Generate a Mermaid class diagram with default options.
pub fn generate_class(diagram: &ClassDiagram) -> String {
    generate_class_with(diagram, &MermaidOptions::default())
}

/// Generate a Mermaid class diagram: relationships first, then entity declarations.
pub fn generate_class_with(diagram: &ClassDiagram, options: &MermaidOptions) -> String {
    let rewriter = BodyRewriter::new();
    let mut lines = vec!["classDiagram".to_string()];

    for rel in &diagram.relationships {
        lines.push(relationship_line(rel, options));
    }

    for entity in diagram.entities.values() {
        push_entity(&mut lines, entity, &rewriter);
    }

    lines.join("\n")
}

fn relationship_line(rel: &ClassRelationship, options: &MermaidOptions) -> String {
    let label = rel
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| options.label(l));

    let mut line = if rel.has_cardinality() {
        let arrow = rel
            .arrow
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_ARROW);
        let mut line = rel.source.clone();
        if let Some(card) = rel.source_cardinality.as_deref().filter(|c| !c.is_empty()) {
            line.push_str(&format!(" \"{}\"", card));
        }
        line.push_str(&format!(" {}", arrow));
        if let Some(card) = rel.target_cardinality.as_deref().filter(|c| !c.is_empty()) {
            line.push_str(&format!(" \"{}\"", card));
        }
        line.push_str(&format!(" {}", rel.target));
        line
    } else {
        match rel.relation {
            // supertype on the left
            RelationKind::Extends => return format!("{} <|-- {}", rel.target, rel.source),
            RelationKind::Implements => return format!("{} <|.. {}", rel.target, rel.source),
            RelationKind::Aggregation => format!("{} o-- {}", rel.source, rel.target),
            RelationKind::Composition => format!("{} *-- {}", rel.source, rel.target),
            RelationKind::Dependency => format!("{} ..> {}", rel.source, rel.target),
            RelationKind::Association | RelationKind::Other => {
                format!("{} {} {}", rel.source, DEFAULT_ARROW, rel.target)
            }
        }
    };

    if let Some(label) = label {
        line.push_str(&format!(" : {}", label));
    }
    line
}

fn push_entity(lines: &mut Vec<String>, entity: &ClassEntity, rewriter: &BodyRewriter) {
    if entity.body.is_empty() {
        if entity.is_interface() {
            lines.push(format!("class {} <<interface>>", entity.name));
        } else {
            lines.push(format!("class {}", entity.name));
        }
        return;
    }

    lines.push(format!("class {} {{", entity.name));
    if entity.is_interface() {
        lines.push("    <<interface>>".to_string());
    }
    for body_line in entity.body.lines() {
        lines.push(format!("    {}", rewriter.rewrite(body_line)));
    }
    lines.push("}".to_string());
}
