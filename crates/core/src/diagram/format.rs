//! Output formats

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::spec::DiagramSpec;

/// How diagram text is written to disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown document with a section per collection and a fenced diagram
    #[default]
    Md,
    /// Raw Mermaid text
    Mermaid,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Md => "md",
            OutputFormat::Mermaid => "mmd",
        }
    }

    /// Wrap rendered diagram text for output
    pub fn wrap(&self, spec: &DiagramSpec, diagram: &str) -> String {
        let diagram = diagram.trim_end();
        match self {
            OutputFormat::Mermaid => format!("{diagram}\n"),
            OutputFormat::Md => {
                let mut out = String::from("# Database Schema\n\n");
                for node in &spec.nodes {
                    out.push_str(&format!("## {}\n\n", node.name));
                    out.push_str(&format!(
                        "Sampled {} document(s), {} field(s).\n\n",
                        node.sample_count,
                        node.fields.len()
                    ));
                    if !node.fields.is_empty() {
                        out.push_str("| Field | Type | Required |\n|---|---|---|\n");
                        for field in &node.fields {
                            out.push_str(&format!(
                                "| `{}` | `{}` | {} |\n",
                                field.path,
                                field.display.replace('|', "\\|"),
                                if field.required { "yes" } else { "no" }
                            ));
                        }
                        out.push('\n');
                    }
                }
                out.push_str("```mermaid\n");
                out.push_str(diagram);
                out.push_str("\n```\n");
                out
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Md => write!(f, "md"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Md),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            other => Err(format!(
                "Unknown output format '{other}', expected 'md' or 'mermaid'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{DiagramField, DiagramNode};

    fn spec() -> DiagramSpec {
        DiagramSpec {
            nodes: vec![
                DiagramNode {
                    name: "users".to_string(),
                    fields: vec![DiagramField {
                        path: "tag".to_string(),
                        type_name: "mixed".to_string(),
                        display: "int | string".to_string(),
                        required: false,
                        nullable: false,
                        key: None,
                    }],
                    sample_count: 3,
                },
                DiagramNode {
                    name: "managers".to_string(),
                    fields: vec![],
                    sample_count: 0,
                },
            ],
            edges: vec![],
        }
    }

    const DIAGRAM: &str = "erDiagram\n    users {\n        mixed tag\n    }\n";

    #[test]
    fn test_mermaid_is_raw() {
        let out = OutputFormat::Mermaid.wrap(&spec(), DIAGRAM);
        assert_eq!(out, DIAGRAM);
        assert!(!out.contains('#'));
    }

    #[test]
    fn test_md_wraps_with_headings() {
        let out = OutputFormat::Md.wrap(&spec(), DIAGRAM);
        assert!(out.starts_with("# Database Schema\n"));

        let users = out.find("## users").unwrap();
        let managers = out.find("## managers").unwrap();
        let fence = out.find("```mermaid\nerDiagram").unwrap();
        assert!(users < managers && managers < fence);
        assert!(out.contains("| `tag` | `int \\| string` | no |"));
        assert!(out.ends_with("    }\n```\n"));
    }

    #[test]
    fn test_extension_and_parse() {
        assert_eq!(OutputFormat::Md.extension(), "md");
        assert_eq!(OutputFormat::Mermaid.extension(), "mmd");
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Md);
        assert_eq!(
            "mermaid".parse::<OutputFormat>().unwrap(),
            OutputFormat::Mermaid
        );
        assert!("svg".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Mermaid.to_string(), "mermaid");
    }
}
