//! Intermediate diagram model shared by the PlantUML parsers and the Mermaid
//! generators. Plain values only; a model is built once per conversion.

mod registry;
mod types;

pub use registry::Registry;
pub use types::*;
