//! `docschema relationships`

use clap::Args;
use docschema_core::pipeline::{RendererKind, SchemaGenerator};

use super::SourceArgs;
use crate::error::CliError;
use crate::output;

#[derive(Args, Debug, Clone)]
pub struct RelationshipsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Compare sampled values to settle ambiguous targets
    #[arg(long)]
    pub value_overlap: bool,

    /// Print relationships as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Handle the `relationships` command
pub async fn handle_relationships(args: &RelationshipsArgs) -> Result<(), CliError> {
    let mut config = args.source.load_config()?;
    config.renderer.kind = RendererKind::Local;
    if args.value_overlap {
        config.relationships.value_overlap = true;
    }

    let generator = SchemaGenerator::from_config(config).await?;
    let (schemas, skipped) = generator.infer_schemas().await?;
    let relationships = generator.detect_relationships(&schemas);

    if args.json {
        output::print_json(&relationships)?;
    } else if relationships.is_empty() {
        eprintln!("No relationships detected across {} collection(s)", schemas.len());
    } else {
        for relationship in &relationships {
            println!("{}", output::format_relationship(relationship));
        }
    }
    output::print_skipped(&skipped);
    Ok(())
}
