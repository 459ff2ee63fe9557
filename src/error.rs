//! Error type for the fallible edges of a conversion: file and stdin I/O,
//! configuration decoding and model emission. Parsing and generation
//! themselves never fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to read from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config TOML: {0}")]
    ConfigToml(#[from] toml::de::Error),

    #[error("Failed to parse config YAML: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("Failed to parse config file {} as TOML or YAML", .0.display())]
    ConfigFormat(PathBuf),

    #[error("Failed to serialize diagram model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input is empty")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, Error>;
