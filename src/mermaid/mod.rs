//! Mermaid text generators, one per diagram kind.

mod class;
mod flowchart;
mod sequence;

pub use class::{generate_class, generate_class_with, process_body_line};
pub use flowchart::{generate_component, generate_component_with};
pub use sequence::{generate_sequence, generate_sequence_with};

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::escape::escape_text;

/// Direction of the generated flowchart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    #[serde(rename = "TD", alias = "TB")]
    TopDown,
    #[serde(rename = "BT")]
    BottomUp,
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "RL")]
    RightLeft,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::TopDown => "TD",
            FlowDirection::BottomUp => "BT",
            FlowDirection::LeftRight => "LR",
            FlowDirection::RightLeft => "RL",
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tb" | "td" => Ok(FlowDirection::TopDown),
            "bt" => Ok(FlowDirection::BottomUp),
            "lr" => Ok(FlowDirection::LeftRight),
            "rl" => Ok(FlowDirection::RightLeft),
            _ => Err(format!(
                "Unknown flowchart direction '{}' (use TD, BT, LR or RL)",
                s
            )),
        }
    }
}

/// Output knobs shared by all generators
#[derive(Debug, Clone, PartialEq)]
pub struct MermaidOptions {
    pub direction: FlowDirection,
    /// Apply Mermaid escaping to labels, message text and conditions.
    pub escape_labels: bool,
    /// Emit `participant Alias as Label` for lifelines declared with a label.
    pub participant_labels: bool,
}

impl Default for MermaidOptions {
    fn default() -> Self {
        Self {
            direction: FlowDirection::default(),
            escape_labels: true,
            participant_labels: false,
        }
    }
}

impl MermaidOptions {
    pub(crate) fn label<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.escape_labels {
            Cow::Owned(escape_text(text))
        } else {
            Cow::Borrowed(text)
        }
    }
}
