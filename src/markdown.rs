//! Rewrite PlantUML fenced code blocks inside a Markdown document as Mermaid
//! blocks, leaving every other byte of the document untouched.

use std::ops::Range;

use log::debug;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::convert::{DiagramKind, convert_with};
use crate::detect::detect_kind;
use crate::mermaid::MermaidOptions;

const FENCE_LANGUAGES: &[&str] = &["plantuml", "puml"];

struct PlantUmlBlock {
    range: Range<usize>,
    kind: Option<DiagramKind>,
    source: String,
}

/// Whether a fence info string opens a PlantUML block, and the kind named by
/// its optional second word.
fn plantuml_fence(info: &str) -> Option<Option<DiagramKind>> {
    let mut words = info.split_whitespace();
    let language = words.next()?;
    if !FENCE_LANGUAGES
        .iter()
        .any(|l| language.eq_ignore_ascii_case(l))
    {
        return None;
    }
    Some(words.next().and_then(|w| w.parse().ok()))
}

/// Convert every ```` ```plantuml ```` / ```` ```puml ```` fenced block of
/// `markdown` into a ```` ```mermaid ```` block.
pub fn convert_markdown(markdown: &str, options: &MermaidOptions) -> String {
    let mut output = String::with_capacity(markdown.len());
    let mut copied = 0;
    let mut current: Option<PlantUmlBlock> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        if let Some(block) = current.as_mut() {
            match event {
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = current.take() {
                        output.push_str(&markdown[copied..block.range.start]);
                        push_mermaid_block(&mut output, markdown, &block, options);
                        copied = block.range.end;
                    }
                }
                Event::Text(text) => block.source.push_str(&text),
                _ => {}
            }
            continue;
        }

        if let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) = &event {
            if let Some(kind) = plantuml_fence(info) {
                current = Some(PlantUmlBlock {
                    range,
                    kind,
                    source: String::new(),
                });
            }
        }
    }

    output.push_str(&markdown[copied..]);
    output
}

/// Prefix for the lines after a fence: blockquote markers and indentation
/// are kept, list markers become spaces.
fn continuation_prefix(fence_prefix: &str) -> String {
    fence_prefix
        .chars()
        .map(|c| if c == '>' || c.is_whitespace() { c } else { ' ' })
        .collect()
}

fn push_mermaid_block(
    output: &mut String,
    markdown: &str,
    block: &PlantUmlBlock,
    options: &MermaidOptions,
) {
    let kind = block.kind.unwrap_or_else(|| detect_kind(&block.source));
    debug!(kind = kind.as_str(), offset = block.range.start; "Converting PlantUML block");

    let line_start = markdown[..block.range.start]
        .rfind('\n')
        .map_or(0, |i| i + 1);
    let prefix = continuation_prefix(&markdown[line_start..block.range.start]);

    output.push_str("```mermaid");
    for line in convert_with(kind, &block.source, options).lines() {
        output.push('\n');
        output.push_str(&prefix);
        output.push_str(line);
    }
    output.push('\n');
    output.push_str(&prefix);
    output.push_str("```");
    if markdown[block.range.clone()].ends_with('\n') {
        output.push('\n');
    }
}
