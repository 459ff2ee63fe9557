use log::{debug, trace};
use regex::Regex;

use super::{label, pattern, source_lines};
use crate::model::{Component, ComponentDiagram, Edge, Registry};

struct ComponentPatterns {
    quoted: Regex,
    simple: Regex,
    edge: Regex,
}

impl ComponentPatterns {
    fn new() -> Self {
        Self {
            quoted: pattern(r#"(?i)^component\s+"([^"]+)"\s+as\s+(\w+)"#),
            simple: pattern(r"(?i)^component\s+(\w+)"),
            edge: pattern(r"^(\w+)\s+(-->|<--)\s+(\w+)(?:\s*:\s*(.+))?$"),
        }
    }
}

/// Parse a PlantUML component diagram.
///
/// Edges are always stored in arrow-head direction: `A <-- B` is recorded as
/// `B -> A`. Edge endpoints that were never declared become components whose
/// label is their id.
pub fn parse_component(input: &str) -> ComponentDiagram {
    let patterns = ComponentPatterns::new();
    let mut components: Registry<Component> = Registry::new();
    let mut edges: Vec<Edge> = Vec::new();

    for line in source_lines(input) {
        // component "Label" as Id
        if let Some(caps) = patterns.quoted.captures(line) {
            let id = &caps[2];
            components.insert(
                id,
                Component {
                    id: id.to_string(),
                    label: caps[1].to_string(),
                },
            );
            continue;
        }

        // component Id
        if let Some(caps) = patterns.simple.captures(line) {
            let id = &caps[1];
            components.insert_if_absent(id, || Component::bare(id));
            continue;
        }

        if let Some(caps) = patterns.edge.captures(line) {
            let (mut source, mut target) = (&caps[1], &caps[3]);
            if caps[2].starts_with('<') {
                std::mem::swap(&mut source, &mut target);
            }

            for endpoint in [source, target] {
                if components.insert_if_absent(endpoint, || Component::bare(endpoint)) {
                    trace!(component = endpoint; "Auto-created component");
                }
            }

            edges.push(Edge {
                source: source.to_string(),
                target: target.to_string(),
                label: label(&caps, 4),
            });
            continue;
        }

        debug!(line; "Skipping unrecognized component diagram line");
    }

    ComponentDiagram {
        components: components.into_values().collect(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_quoted_components_and_edge() {
        let input = r#"
@startuml
component "UI" as A
component "VM" as B
A --> B : click
@enduml
"#;
        let diagram = parse_component(input);
        assert_eq!(diagram.components.len(), 2);
        assert_eq!(diagram.components[0].id, "A");
        assert_eq!(diagram.components[0].label, "UI");
        assert_eq!(diagram.components[1].label, "VM");

        assert_eq!(diagram.edges.len(), 1);
        let edge = &diagram.edges[0];
        assert_eq!(edge.source, "A");
        assert_eq!(edge.target, "B");
        assert_eq!(edge.label, Some("click".to_string()));
    }

    #[test]
    fn test_parse_reversed_arrow_swaps_endpoints() {
        let diagram = parse_component("VM <-- BL : New data");
        let edge = &diagram.edges[0];
        assert_eq!(edge.source, "BL");
        assert_eq!(edge.target, "VM");
        assert_eq!(edge.label.as_deref(), Some("New data"));
    }

    #[test]
    fn test_parse_auto_creates_endpoints() {
        let diagram = parse_component("component Api\nApi --> Db");
        let ids: Vec<&str> = diagram.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Api", "Db"]);
        let db = diagram.component("Db").unwrap();
        assert_eq!(db.label, "Db");
        assert_eq!(diagram.edges[0].label, None);
    }

    #[test]
    fn test_bare_declaration_does_not_replace_label() {
        let diagram = parse_component("component \"Web UI\" as Ui\ncomponent Ui");
        assert_eq!(diagram.components.len(), 1);
        assert_eq!(diagram.components[0].label, "Web UI");
    }

    #[test]
    fn test_quoted_declaration_relabels_auto_created() {
        let diagram = parse_component("A --> B\ncomponent \"Backend\" as B");
        let ids: Vec<&str> = diagram.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(diagram.component("B").unwrap().label, "Backend");
    }

    #[test]
    fn test_unrecognized_lines_are_skipped() {
        let diagram = parse_component("skinparam monochrome true\nA -> B\nnode X");
        assert!(diagram.components.is_empty());
        assert!(diagram.edges.is_empty());
    }

    proptest! {
        #[test]
        fn every_edge_endpoint_is_a_component(
            pairs in prop::collection::vec(("[A-Za-z][A-Za-z0-9_]{0,6}", "[A-Za-z][A-Za-z0-9_]{0,6}", any::<bool>()), 0..12)
        ) {
            let input: String = pairs
                .iter()
                .map(|(a, b, reversed)| format!("{} {} {}\n", a, if *reversed { "<--" } else { "-->" }, b))
                .collect();
            let diagram = parse_component(&input);
            prop_assert_eq!(diagram.edges.len(), pairs.len());
            for edge in &diagram.edges {
                prop_assert!(diagram.component(&edge.source).is_some());
                prop_assert!(diagram.component(&edge.target).is_some());
            }
        }
    }
}
