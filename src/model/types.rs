use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Registry;

// ============================================
// Component Diagram Types
// ============================================

/// A node in a component diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub label: String,
}

impl Component {
    /// A component whose label is its id, as created for undeclared edge endpoints.
    pub fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
        }
    }
}

/// A directed relation between two component ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDiagram {
    pub components: Vec<Component>,
    pub edges: Vec<Edge>,
}

impl ComponentDiagram {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }
}

// ============================================
// Class Diagram Types
// ============================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

impl FromStr for ClassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(ClassKind::Class),
            "interface" => Ok(ClassKind::Interface),
            other => Err(format!("Unknown class kind '{}'", other)),
        }
    }
}

/// A class or interface, keyed by name in [`ClassDiagram::entities`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    pub kind: ClassKind,
    /// Raw member lines joined with `\n`; empty when declared without a block.
    pub body: String,
}

impl ClassEntity {
    pub fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            body: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Extends,
    Implements,
    Aggregation,
    Composition,
    Dependency,
    Association,
    Other,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Composition => "composition",
            RelationKind::Dependency => "dependency",
            RelationKind::Association => "association",
            RelationKind::Other => "other",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = std::convert::Infallible;

    /// Unknown keywords map to [`RelationKind::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "extends" => RelationKind::Extends,
            "implements" => RelationKind::Implements,
            "aggregation" => RelationKind::Aggregation,
            "composition" => RelationKind::Composition,
            "dependency" => RelationKind::Dependency,
            "association" => RelationKind::Association,
            _ => RelationKind::Other,
        })
    }
}

/// A relation between two class entities.
///
/// `source` is always the more specific side: the child of an `extends`, the
/// implementor of an `implements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRelationship {
    pub source: String,
    pub target: String,
    pub relation: RelationKind,
    pub label: Option<String>,
    pub source_cardinality: Option<String>,
    pub target_cardinality: Option<String>,
    /// Literal arrow token, kept only for cardinality-style lines.
    pub arrow: Option<String>,
}

impl ClassRelationship {
    pub fn new(source: &str, target: &str, relation: RelationKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation,
            label: None,
            source_cardinality: None,
            target_cardinality: None,
            arrow: None,
        }
    }

    pub fn with_label(mut self, label: Option<&str>) -> Self {
        self.label = label.map(str::to_string);
        self
    }

    pub fn has_cardinality(&self) -> bool {
        let present = |c: &Option<String>| c.as_deref().is_some_and(|c| !c.is_empty());
        present(&self.source_cardinality) || present(&self.target_cardinality)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDiagram {
    pub entities: Registry<ClassEntity>,
    pub relationships: Vec<ClassRelationship>,
}

// ============================================
// Sequence Diagram Types
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    /// Display label from a `"Label" as Alias` declaration
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub label: Option<String>,
}

impl Participant {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub receiver: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub participant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// `None` for a free-floating note
    pub participant: Option<String>,
    pub text: String,
}

/// One arm of an `alt` (its condition) or a `par` (its label)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub label: String,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltBlock {
    pub alternatives: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopBlock {
    pub condition: String,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParBlock {
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Message(Message),
    Activate(Activation),
    Deactivate(Activation),
    Note(Note),
    Alt(AltBlock),
    Loop(LoopBlock),
    Par(ParBlock),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceDiagram {
    pub actors: Registry<Actor>,
    pub participants: Registry<Participant>,
    pub events: Vec<Event>,
}

impl SequenceDiagram {
    /// Whether `name` is a known lifeline of either kind.
    pub fn has_lifeline(&self, name: &str) -> bool {
        self.actors.contains(name) || self.participants.contains(name)
    }
}
