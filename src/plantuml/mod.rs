//! Line-oriented parsers for the supported PlantUML subset.
//!
//! Every parser is infallible: lines it does not recognize are logged and
//! skipped, undeclared references are auto-created.

mod class;
mod component;
mod sequence;

pub use class::parse_class;
pub use component::parse_component;
pub use sequence::parse_sequence;

use regex::Regex;

/// Trimmed, non-blank source lines with `@startuml`/`@enduml` style directives
/// and `'` comments removed.
pub(crate) fn source_lines(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('@') && !line.starts_with('\''))
        .collect()
}

/// Compile one of the parsers' fixed patterns.
pub(crate) fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("built-in PlantUML pattern must compile")
}

/// Optional `: label` capture, trimmed; `None` when absent or blank.
pub(crate) fn label(caps: &regex::Captures<'_>, group: usize) -> Option<String> {
    caps.get(group)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::source_lines;

    #[test]
    fn test_source_lines_strip_directives_and_blanks() {
        let input = r#"
@startuml
  ' a comment
  A --> B

@enduml
"#;
        assert_eq!(source_lines(input), vec!["A --> B"]);
    }
}
