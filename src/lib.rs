//! Convert PlantUML component, class and sequence diagrams to Mermaid.
//!
//! Each diagram kind has a parser in [`plantuml`] that builds a model from
//! [`model`], and a generator in [`mermaid`] that turns the model into
//! Mermaid text. Parsing and generation never fail: unrecognized lines are
//! skipped and reported through the `log` facade.
//!
//! ```
//! use plantmaid::{DiagramKind, convert};
//!
//! let mermaid = convert(DiagramKind::Component, "component \"UI\" as A\nA --> B : click");
//! assert!(mermaid.contains("A -->|click| B"));
//! ```

pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod escape;
pub mod markdown;
pub mod mermaid;
pub mod model;
pub mod plantuml;

pub use config::{Config, KindSetting};
pub use convert::{DiagramKind, DiagramModel, convert, convert_with, generate, generate_with, parse};
pub use detect::detect_kind;
pub use error::{Error, Result};
pub use markdown::convert_markdown;
pub use mermaid::{FlowDirection, MermaidOptions};
