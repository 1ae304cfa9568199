//! Local Mermaid renderer
//!
//! Produces the `erDiagram` text directly from the spec, without any network
//! call. It is the default renderer and also supplies the draft that LLM
//! renderers are asked to polish.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use async_trait::async_trait;

use super::error::RenderError;
use super::renderer::DiagramRenderer;
use super::spec::{DiagramField, DiagramSpec, KeyKind};
use crate::inference::path::ARRAY_MARKER;
use crate::relationships::Cardinality;

const INDENT: &str = "    ";

/// Deterministic `erDiagram` renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidRenderer;

impl MermaidRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the diagram text
    ///
    /// Entity and attribute identifiers stay distinct even when two names
    /// sanitize to the same text.
    pub fn render_text(&self, spec: &DiagramSpec) -> String {
        let mut out = String::from("erDiagram\n");

        let mut entities = NameScope::new();
        let ids: HashMap<&str, String> = spec
            .nodes
            .iter()
            .map(|node| (node.name.as_str(), entities.claim(sanitize_identifier(&node.name))))
            .collect();
        let id_of = |name: &str| {
            ids.get(name)
                .cloned()
                .unwrap_or_else(|| sanitize_identifier(name))
        };

        for node in &spec.nodes {
            let _ = writeln!(out, "{INDENT}{} {{", id_of(&node.name));
            let mut attributes = NameScope::new();
            for field in &node.fields {
                let name = attributes.claim(sanitize_identifier(&field.path.replace(ARRAY_MARKER, "")));
                let _ = writeln!(out, "{INDENT}{INDENT}{}", attribute_line(field, &name));
            }
            let _ = writeln!(out, "{INDENT}}}");
        }

        for edge in &spec.edges {
            let marker = match edge.cardinality {
                Cardinality::One => "||--o{",
                Cardinality::Many => "}o--o{",
            };
            let _ = writeln!(
                out,
                "{INDENT}{} {marker} {} : \"{}\"",
                id_of(&edge.source),
                id_of(&edge.target),
                edge.field.replace('"', "'"),
            );
        }

        out
    }
}

#[async_trait]
impl DiagramRenderer for MermaidRenderer {
    fn name(&self) -> &str {
        "local"
    }

    async fn render(&self, spec: &DiagramSpec) -> Result<String, RenderError> {
        Ok(self.render_text(spec))
    }
}

fn attribute_line(field: &DiagramField, name: &str) -> String {
    let mut line = format!("{} {name}", field.type_name);

    match field.key {
        Some(KeyKind::Primary) => line.push_str(" PK"),
        Some(KeyKind::Foreign) => line.push_str(" FK"),
        None => {}
    }

    let comment = match (field.required, field.nullable) {
        (true, false) => None,
        (false, false) => Some("optional"),
        (true, true) => Some("nullable"),
        (false, true) => Some("optional, nullable"),
    };
    if let Some(comment) = comment {
        let _ = write!(line, " \"{comment}\"");
    }
    line
}

/// Make a name usable as a Mermaid entity or attribute identifier
///
/// Dots, spaces and other punctuation become `_`; a leading digit gets a
/// `_` prefix.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        out.insert(0, '_');
    }
    out
}

/// Hands out names that are unique within one scope
///
/// A name that is already taken gets `_2`, `_3` and so on appended.
#[derive(Debug, Default)]
pub struct NameScope {
    taken: HashSet<String>,
    ignore_case: bool,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope where names differing only in ASCII case collide
    pub fn ignoring_case() -> Self {
        Self {
            ignore_case: true,
            ..Self::default()
        }
    }

    /// Reserve `base`, or the first free suffixed variant of it
    pub fn claim(&mut self, base: String) -> String {
        if self.take(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.take(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn take(&mut self, name: &str) -> bool {
        let key = if self.ignore_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        };
        self.taken.insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{DiagramEdge, DiagramNode};
    use crate::relationships::RelationshipKind;

    fn field(path: &str, type_name: &str, required: bool, key: Option<KeyKind>) -> DiagramField {
        DiagramField {
            path: path.to_string(),
            type_name: type_name.to_string(),
            display: type_name.to_string(),
            required,
            nullable: false,
            key,
        }
    }

    fn spec() -> DiagramSpec {
        DiagramSpec {
            nodes: vec![
                DiagramNode {
                    name: "users".to_string(),
                    fields: vec![
                        field("name", "string", true, None),
                        field("email", "string", false, None),
                        field("manager_id", "objectId", true, Some(KeyKind::Foreign)),
                        field("address.city", "string", true, None),
                        field("roles[].name", "string", true, None),
                    ],
                    sample_count: 2,
                },
                DiagramNode {
                    name: "managers".to_string(),
                    fields: vec![field("name", "string", true, None)],
                    sample_count: 1,
                },
            ],
            edges: vec![DiagramEdge {
                source: "users".to_string(),
                field: "manager_id".to_string(),
                target: "managers".to_string(),
                kind: RelationshipKind::NamingConvention,
                cardinality: Cardinality::One,
            }],
        }
    }

    #[test]
    fn test_render_text() {
        let text = MermaidRenderer.render_text(&spec());
        let expected = "\
erDiagram
    users {
        string name
        string email \"optional\"
        objectId manager_id FK
        string address_city
        string roles_name
    }
    managers {
        string name
    }
    users ||--o{ managers : \"manager_id\"
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_many_cardinality_marker() {
        let mut spec = spec();
        spec.edges[0].cardinality = Cardinality::Many;
        let text = MermaidRenderer.render_text(&spec);
        assert!(text.contains("users }o--o{ managers : \"manager_id\""));
    }

    #[test]
    fn test_nullable_comment() {
        let mut f = field("nick", "string", false, None);
        f.nullable = true;
        assert_eq!(attribute_line(&f, "nick"), "string nick \"optional, nullable\"");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("order items"), "order_items");
        assert_eq!(sanitize_identifier("system.profile"), "system_profile");
        assert_eq!(sanitize_identifier("2024_logs"), "_2024_logs");
        assert_eq!(sanitize_identifier("user-events"), "user-events");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_colliding_names_stay_distinct() {
        let spec = DiagramSpec {
            nodes: vec![
                DiagramNode {
                    name: "user events".to_string(),
                    fields: vec![
                        field("roles[].name", "string", true, None),
                        field("roles_name", "string", false, None),
                    ],
                    sample_count: 1,
                },
                DiagramNode {
                    name: "user_events".to_string(),
                    fields: vec![field("user_event_id", "objectId", true, Some(KeyKind::Foreign))],
                    sample_count: 1,
                },
            ],
            edges: vec![DiagramEdge {
                source: "user_events".to_string(),
                field: "user_event_id".to_string(),
                target: "user events".to_string(),
                kind: RelationshipKind::NamingConvention,
                cardinality: Cardinality::One,
            }],
        };

        let text = MermaidRenderer.render_text(&spec);
        assert!(text.contains("    user_events {\n        string roles_name\n        string roles_name_2 \"optional\"\n"));
        assert!(text.contains("    user_events_2 {\n"));
        assert!(text.contains("user_events_2 ||--o{ user_events : \"user_event_id\""));
    }

    #[test]
    fn test_name_scope() {
        let mut scope = NameScope::new();
        assert_eq!(scope.claim("a".to_string()), "a");
        assert_eq!(scope.claim("a".to_string()), "a_2");
        assert_eq!(scope.claim("a".to_string()), "a_3");
        assert_eq!(scope.claim("A".to_string()), "A");

        let mut files = NameScope::ignoring_case();
        assert_eq!(files.claim("Users".to_string()), "Users");
        assert_eq!(files.claim("users".to_string()), "users_2");
    }

    #[tokio::test]
    async fn test_renderer_trait() {
        let renderer = MermaidRenderer::new();
        assert_eq!(renderer.name(), "local");
        let text = renderer.render(&spec()).await.unwrap();
        assert!(text.starts_with("erDiagram\n"));
    }
}
