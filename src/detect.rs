//! Guess the diagram kind of PlantUML source that carries no explicit kind.

use log::{debug, trace};
use regex::Regex;

use crate::convert::DiagramKind;
use crate::plantuml::{pattern, source_lines};

struct Detector {
    kind: DiagramKind,
    cue: Regex,
}

/// Detectors in the order they are tried on each line. A line shared by
/// several kinds (`A --> B : x`) matches none of them.
fn detectors() -> Vec<Detector> {
    vec![
        Detector {
            kind: DiagramKind::Sequence,
            cue: pattern(r"(?i)^(actor|participant|activate|deactivate|alt|loop|par|note)\b"),
        },
        Detector {
            kind: DiagramKind::Sequence,
            cue: pattern(r"^\w+\s*->>?\s*\w+\s*:"),
        },
        Detector {
            kind: DiagramKind::Class,
            cue: pattern(r"(?i)^(class|interface)\s+\w+"),
        },
        Detector {
            kind: DiagramKind::Class,
            cue: pattern(r"<\|--|<\|\.\.|\.\.>"),
        },
        Detector {
            kind: DiagramKind::Class,
            cue: pattern(r"(?i)^\w+\s+(extends|implements)\s+\w+"),
        },
        Detector {
            kind: DiagramKind::Class,
            // a relation only decides when it carries a quoted cardinality
            cue: pattern(r#"^\w+\s+(?:"[^"]+"\s+[o*\->]+|[o*\->]+\s+"[^"]+")\s+\w+"#),
        },
        Detector {
            kind: DiagramKind::Component,
            cue: pattern(r"(?i)^component\s+"),
        },
    ]
}

/// Detect the kind of a PlantUML diagram from its first decisive line,
/// falling back to [`DiagramKind::Component`].
pub fn detect_kind(input: &str) -> DiagramKind {
    let detectors = detectors();

    for line in source_lines(input) {
        for detector in &detectors {
            if detector.cue.is_match(line) {
                debug!(kind = detector.kind.as_str(), line; "Detected diagram kind");
                return detector.kind;
            }
        }
        trace!(line; "Line does not decide the diagram kind");
    }

    debug!("No decisive line, falling back to component diagram");
    DiagramKind::Component
}
