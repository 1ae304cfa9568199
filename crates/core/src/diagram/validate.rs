//! Sanity check of renderer output
//!
//! This is not a Mermaid parser. It catches the usual failure modes of a
//! remote renderer: empty replies, prose instead of a diagram, truncated
//! output with unbalanced brackets, and diagrams without any entity.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::RenderError;

/// Cardinality markers such as `||--o{` or `}|..|{`
static RELATIONSHIP_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\|o|\|\||\}o|\}\|)(--|\.\.)(o\||\|\||o\{|\|\{)").unwrap());

/// `name {` or `name["alias"] {` on a line of its own
static ENTITY_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*[^\s{}"\[]+(\["[^"]*"\])?\s*\{\s*$"#).unwrap());

/// Strip a surrounding Markdown code fence, if any
pub fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`mermaid`) on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    let body = match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Check renderer output and return the normalized diagram text
///
/// `expected_nodes` is the number of nodes in the rendered spec; a diagram
/// for a non-empty spec must contain at least one entity block.
pub fn check_diagram(text: &str, expected_nodes: usize) -> Result<String, RenderError> {
    let diagram = strip_fence(text);
    if diagram.is_empty() {
        return Err(RenderError::Invalid("empty diagram".to_string()));
    }

    let header = diagram.lines().next().unwrap_or_default().trim();
    if header != "erDiagram" {
        return Err(RenderError::Invalid(format!(
            "expected 'erDiagram' header, found '{}'",
            truncate(header, 40)
        )));
    }

    let without_markers = RELATIONSHIP_MARKER_REGEX.replace_all(diagram, " ");
    check_brackets(&without_markers)?;

    if expected_nodes > 0 && !ENTITY_BLOCK_REGEX.is_match(&without_markers) {
        return Err(RenderError::Invalid("no entity blocks".to_string()));
    }

    Ok(format!("{diagram}\n"))
}

fn check_brackets(text: &str) -> Result<(), RenderError> {
    let mut stack = Vec::new();
    let mut in_quotes = false;

    for (line_no, line) in text.lines().enumerate() {
        for ch in line.chars() {
            if ch == '"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            match ch {
                '{' | '(' | '[' => stack.push(ch),
                '}' | ')' | ']' => {
                    let expected = match ch {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    if stack.pop() != Some(expected) {
                        return Err(RenderError::Invalid(format!(
                            "unbalanced '{ch}' on line {}",
                            line_no + 1
                        )));
                    }
                }
                _ => {}
            }
        }
    }

    if in_quotes {
        return Err(RenderError::Invalid("unterminated quote".to_string()));
    }
    match stack.last() {
        Some(open) => Err(RenderError::Invalid(format!("unclosed '{open}'"))),
        None => Ok(()),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
