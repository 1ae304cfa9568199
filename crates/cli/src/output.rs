//! Output formatting for CLI

use docschema_core::inference::CollectionSchema;
use docschema_core::pipeline::SkippedCollection;
use docschema_core::relationships::Relationship;

use crate::error::CliError;

/// Plain-text table of every field in a schema
pub fn format_schema(schema: &CollectionSchema) -> String {
    let rows: Vec<(String, String, &str)> = schema
        .fields()
        .map(|field| {
            (
                field.path.clone(),
                field.ty.to_string(),
                if field.required { "yes" } else { "no" },
            )
        })
        .collect();

    let path_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(5);
    let type_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(4);

    let mut out = format!(
        "{} ({} documents sampled, {} fields)\n",
        schema.name(),
        schema.sample_count(),
        schema.len()
    );
    out.push_str(&format!(
        "  {:<path_width$}  {:<type_width$}  REQUIRED\n",
        "FIELD", "TYPE"
    ));
    for (path, ty, required) in rows {
        out.push_str(&format!("  {path:<path_width$}  {ty:<type_width$}  {required}\n"));
    }
    out
}

/// One line per relationship
pub fn format_relationship(relationship: &Relationship) -> String {
    let mut line = format!(
        "{} ({}, {:?}",
        relationship.describe(),
        relationship.kind,
        relationship.cardinality
    );
    if let Some(overlap) = relationship.overlap {
        line.push_str(&format!(", overlap {:.0}%", overlap * 100.0));
    }
    line.push(')');
    line
}

pub fn print_skipped(skipped: &[SkippedCollection]) {
    for entry in skipped {
        eprintln!("Skipped {}: {}", entry.collection, entry.reason);
    }
}

/// Pretty JSON to stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
