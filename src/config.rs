use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::convert::DiagramKind;
use crate::error::{Error, Result};
use crate::mermaid::{FlowDirection, MermaidOptions};

/// Which parser to run: a fixed kind, or detection from the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSetting {
    #[default]
    Auto,
    Component,
    Class,
    Sequence,
}

impl KindSetting {
    /// The fixed kind, or `None` when the kind should be detected.
    pub fn fixed(&self) -> Option<DiagramKind> {
        match self {
            KindSetting::Auto => None,
            KindSetting::Component => Some(DiagramKind::Component),
            KindSetting::Class => Some(DiagramKind::Class),
            KindSetting::Sequence => Some(DiagramKind::Sequence),
        }
    }
}

impl std::str::FromStr for KindSetting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(KindSetting::Auto);
        }
        Ok(match s.parse::<DiagramKind>()? {
            DiagramKind::Component => KindSetting::Component,
            DiagramKind::Class => KindSetting::Class,
            DiagramKind::Sequence => KindSetting::Sequence,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kind: KindSetting,
    #[serde(default)]
    pub direction: FlowDirection,
    #[serde(default = "default_escape_labels")]
    pub escape_labels: bool,
    #[serde(default)]
    pub participant_labels: bool,
}

fn default_escape_labels() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind: KindSetting::default(),
            direction: FlowDirection::default(),
            escape_labels: default_escape_labels(),
            participant_labels: false,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a config file. `.toml`, `.yaml` and `.yml` pick the format;
    /// anything else is tried as TOML, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("toml") => Self::from_toml(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_toml(&content)
                .or_else(|_| Self::from_yaml(&content))
                .map_err(|_| Error::ConfigFormat(path.to_path_buf())),
        }
    }

    pub fn mermaid_options(&self) -> MermaidOptions {
        MermaidOptions {
            direction: self.direction,
            escape_labels: self.escape_labels,
            participant_labels: self.participant_labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.mermaid_options(), MermaidOptions::default());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
kind = "sequence"
direction = "TD"
escape_labels = false
participant_labels = true
"#,
        )
        .unwrap();
        assert_eq!(config.kind.fixed(), Some(DiagramKind::Sequence));
        assert_eq!(config.direction, FlowDirection::TopDown);
        assert!(!config.escape_labels);
        assert!(config.participant_labels);
    }

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml("kind: class\ndirection: TB\n").unwrap();
        assert_eq!(config.kind, KindSetting::Class);
        assert_eq!(config.direction, FlowDirection::TopDown);
        assert!(config.escape_labels);
    }

    #[test]
    fn test_invalid_kind_is_rejected() {
        let err = Config::from_toml(r#"kind = "state""#).unwrap_err();
        assert!(matches!(err, Error::ConfigToml(_)));
    }

    #[test]
    fn test_kind_setting_from_str() {
        assert_eq!("AUTO".parse::<KindSetting>(), Ok(KindSetting::Auto));
        assert_eq!("flow".parse::<KindSetting>(), Ok(KindSetting::Component));
        assert!("erd".parse::<KindSetting>().is_err());
    }

    #[test]
    fn test_load_by_extension_and_fallback() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("plantmaid.yml");
        std::fs::write(&yaml_path, "direction: RL\n").unwrap();
        assert_eq!(
            Config::load(&yaml_path).unwrap().direction,
            FlowDirection::RightLeft
        );

        let mut other = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        writeln!(other, "kind: component").unwrap();
        assert_eq!(
            Config::load(other.path()).unwrap().kind,
            KindSetting::Component
        );

        let bad_path = dir.path().join("plantmaid.conf");
        std::fs::write(&bad_path, "[[[").unwrap();
        assert!(matches!(
            Config::load(&bad_path),
            Err(Error::ConfigFormat(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load(&missing),
            Err(Error::ConfigNotFound(_))
        ));
    }
}
