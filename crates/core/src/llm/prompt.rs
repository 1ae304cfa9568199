//! Prompt templates for LLM-based diagram rendering
//!
//! The model receives the diagram spec as JSON together with a locally
//! rendered draft, and is asked to return a corrected `erDiagram`.

/// System instruction sent with every render request
pub const SYSTEM_PROMPT: &str =
    "You are a MongoDB schema validator. Only output the fixed Mermaid diagram.";

/// Prompt template for diagram rendering
pub const DIAGRAM_PROMPT_TEMPLATE: &str = r#"Review and fix this Mermaid ER diagram of a MongoDB database.

## Rules
1. Remove duplicate type declarations
2. Ensure proper spacing and indentation
3. Fix any syntax errors
4. Keep field names exactly as given, including underscores
5. Keep every entity and every relationship from the schema
6. Return only the diagram, starting with the line `erDiagram`

## Schema
```json
{spec}
```

## Draft
```mermaid
{draft}
```"#;

/// Context for building a render prompt
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// The diagram spec as JSON
    pub spec_json: String,
    /// Locally rendered diagram text
    pub draft: String,
}

impl PromptContext {
    /// Create a new prompt context
    pub fn new(spec_json: impl Into<String>, draft: impl Into<String>) -> Self {
        Self {
            spec_json: spec_json.into(),
            draft: draft.into(),
        }
    }

    /// Build the render prompt
    pub fn build_prompt(&self) -> String {
        DIAGRAM_PROMPT_TEMPLATE
            .replace("{spec}", &self.spec_json)
            .replace("{draft}", self.draft.trim_end())
    }
}

/// Pull the diagram out of an LLM reply
///
/// Text before the `erDiagram` line is dropped, and the diagram ends at
/// the first code fence after it. Returns `None` if there is no
/// `erDiagram` line.
pub fn extract_diagram(response: &str) -> Option<String> {
    let mut lines = response.lines().skip_while(|line| line.trim() != "erDiagram");
    let header = lines.next()?;

    let mut diagram = vec![header.trim()];
    diagram.extend(lines.take_while(|line| !line.trim_start().starts_with("```")));

    while diagram.last().is_some_and(|line| line.trim().is_empty()) {
        diagram.pop();
    }
    Some(format!("{}\n", diagram.join("\n")))
}

/// Estimate the token count for a piece of text
///
/// Uses a rough estimate of 4 characters per token
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
