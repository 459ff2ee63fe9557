use super::MermaidOptions;
use crate::model::ComponentDiagram;

/// Generate a Mermaid flowchart with default options.
pub fn generate_component(diagram: &ComponentDiagram) -> String {
    generate_component_with(diagram, &MermaidOptions::default())
}

/// Generate a Mermaid flowchart: header, one node per component, one link per edge.
pub fn generate_component_with(diagram: &ComponentDiagram, options: &MermaidOptions) -> String {
    let mut lines = vec![format!("flowchart {}", options.direction)];

    for component in &diagram.components {
        lines.push(format!(
            "{}[\"{}\"]",
            component.id,
            options.label(&component.label)
        ));
    }

    for edge in &diagram.edges {
        match edge.label.as_deref().filter(|l| !l.is_empty()) {
            Some(label) => lines.push(format!(
                "{} -->|{}| {}",
                edge.source,
                options.label(label),
                edge.target
            )),
            None => lines.push(format!("{} --> {}", edge.source, edge.target)),
        }
    }

    lines.join("\n")
}
