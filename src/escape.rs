/// Escape text for use as a Mermaid label:
/// - `&` -> `&amp#59;` (the `&amp;` entity with its own `;` escaped)
/// - `;` -> `#59;`
/// - newline, or the two-character sequence `\n` -> `<br>`
/// - `(` -> `#40;`, `)` -> `#41;`
///
/// No raw `;` survives, since Mermaid reads it as a statement break.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => escaped.push_str("&amp#59;"),
            ';' => escaped.push_str("#59;"),
            '(' => escaped.push_str("#40;"),
            ')' => escaped.push_str("#41;"),
            '\n' => escaped.push_str("<br>"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\\' if chars.peek() == Some(&'n') => {
                chars.next();
                escaped.push_str("<br>");
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format a lifeline name: escape it, escape embedded double quotes, and wrap
/// the result in quotes when it contains whitespace.
pub fn format_name(name: &str) -> String {
    let escaped = escape_text(name).replace('"', "\\\"");
    if escaped.chars().any(char::is_whitespace) {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

/// Block conditions (`alt`, `loop`, `par`) are escaped but never quoted.
pub fn format_condition(text: &str) -> String {
    escape_text(text)
}
