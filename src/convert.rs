use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mermaid::{self, MermaidOptions};
use crate::model::{ClassDiagram, ComponentDiagram, SequenceDiagram};
use crate::plantuml;

/// The diagram kinds the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Component,
    Class,
    Sequence,
}

impl DiagramKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Component => "component",
            DiagramKind::Class => "class",
            DiagramKind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "component" | "components" | "flow" | "flowchart" => Ok(DiagramKind::Component),
            "class" => Ok(DiagramKind::Class),
            "sequence" => Ok(DiagramKind::Sequence),
            _ => Err(format!(
                "Unknown diagram kind '{}' (use component, class or sequence)",
                s
            )),
        }
    }
}

/// A parsed diagram of any supported kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "diagram", rename_all = "lowercase")]
pub enum DiagramModel {
    Component(ComponentDiagram),
    Class(ClassDiagram),
    Sequence(SequenceDiagram),
}

impl DiagramModel {
    pub fn kind(&self) -> DiagramKind {
        match self {
            DiagramModel::Component(_) => DiagramKind::Component,
            DiagramModel::Class(_) => DiagramKind::Class,
            DiagramModel::Sequence(_) => DiagramKind::Sequence,
        }
    }
}

/// Parse PlantUML source as the given kind.
pub fn parse(kind: DiagramKind, input: &str) -> DiagramModel {
    match kind {
        DiagramKind::Component => DiagramModel::Component(plantuml::parse_component(input)),
        DiagramKind::Class => DiagramModel::Class(plantuml::parse_class(input)),
        DiagramKind::Sequence => DiagramModel::Sequence(plantuml::parse_sequence(input)),
    }
}

pub fn generate(model: &DiagramModel) -> String {
    generate_with(model, &MermaidOptions::default())
}

pub fn generate_with(model: &DiagramModel, options: &MermaidOptions) -> String {
    match model {
        DiagramModel::Component(diagram) => mermaid::generate_component_with(diagram, options),
        DiagramModel::Class(diagram) => mermaid::generate_class_with(diagram, options),
        DiagramModel::Sequence(diagram) => mermaid::generate_sequence_with(diagram, options),
    }
}

/// Convert PlantUML source to Mermaid text with default options.
pub fn convert(kind: DiagramKind, input: &str) -> String {
    convert_with(kind, input, &MermaidOptions::default())
}

pub fn convert_with(kind: DiagramKind, input: &str, options: &MermaidOptions) -> String {
    generate_with(&parse(kind, input), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Sequence".parse::<DiagramKind>(), Ok(DiagramKind::Sequence));
        assert_eq!("flowchart".parse::<DiagramKind>(), Ok(DiagramKind::Component));
        assert_eq!("components".parse::<DiagramKind>(), Ok(DiagramKind::Component));
        assert!("state".parse::<DiagramKind>().is_err());
    }

    #[test]
    fn test_component_scenario() {
        let input = r#"
@startuml
component "UI" as A
component "VM" as B
A --> B : click
@enduml
"#;
        let output = convert(DiagramKind::Component, input);
        assert!(output.starts_with("flowchart LR"));
        assert!(output.contains("A[\"UI\"]"));
        assert!(output.contains("A -->|click| B"));
    }

    #[test]
    fn test_class_cardinality_scenario() {
        let input = r#"
class Customer {
    +int id
}
Customer "1" --> "0..*" Order : places
"#;
        let output = convert(DiagramKind::Class, input);
        assert!(output.contains("Customer \"1\" --> \"0..*\" Order : places"));
        assert!(output.contains("class Customer {\n    +int id\n}"));
        assert!(output.contains("\nclass Order"));
    }

    #[test]
    fn test_class_inheritance_scenario() {
        let output = convert(DiagramKind::Class, "Animal <|-- Duck");
        assert!(output.contains("Animal <|-- Duck"));

        // keyword form still renders supertype first
        let output = convert(DiagramKind::Class, "Duck extends Animal\nSquare implements Shape");
        assert!(output.contains("Animal <|-- Duck"));
        assert!(output.contains("Shape <|.. Square"));
        assert!(output.contains("class Shape <<interface>>"));
    }

    #[test]
    fn test_sequence_alt_activation_scenario() {
        let input = r#"
@startuml
participant App
participant Auth
App -> Auth: login
alt success
    activate Auth
    Auth -> App: token
else failure
    deactivate Auth
    Auth -> App: error
end
deactivate Auth
@enduml
"#;
        let output = convert(DiagramKind::Sequence, input);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "sequenceDiagram",
                "participant App",
                "participant Auth",
                "App->>Auth: login",
                "alt success",
                "activate Auth",
                "Auth->>App: token",
                "else failure",
                "deactivate Auth",
                "Auth->>App: error",
                "end",
            ]
        );
    }

    #[test]
    fn test_sequence_global_note_scenario() {
        let output = convert(DiagramKind::Sequence, "A -> B: go\nnote: done");
        assert!(output.lines().any(|l| l == "Note: done"));
    }

    #[test]
    fn test_sequence_message_with_ampersand_stays_one_statement() {
        let output = convert(DiagramKind::Sequence, "A -> B: salt & pepper (fresh)");
        let message = output.lines().last().unwrap();
        assert_eq!(message, "A->>B: salt &amp#59; pepper #40;fresh#41;");

        let stripped = message
            .replace("#59;", "")
            .replace("#40;", "")
            .replace("#41;", "");
        assert!(!stripped.contains(';'));
    }

    #[test]
    fn test_empty_input_yields_header_only() {
        assert_eq!(convert(DiagramKind::Component, ""), "flowchart LR");
        assert_eq!(convert(DiagramKind::Class, "@startuml\n@enduml"), "classDiagram");
        assert_eq!(convert(DiagramKind::Sequence, "   \n"), "sequenceDiagram");
    }

    #[test]
    fn test_model_serializes_with_kind_tag() {
        let model = parse(DiagramKind::Component, "component A");
        assert_eq!(model.kind(), DiagramKind::Component);

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["kind"], "component");
        assert_eq!(json["diagram"]["components"][0]["id"], "A");
    }
}
