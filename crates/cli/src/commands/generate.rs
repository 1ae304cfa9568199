//! `docschema generate`

use std::path::PathBuf;

use clap::Args;
use docschema_core::diagram::OutputFormat;
use docschema_core::pipeline::{Granularity, RendererKind, SchemaGenerator};

use super::SourceArgs;
use crate::error::CliError;
use crate::output;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format (md, mermaid)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Directory the diagram file(s) are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// One diagram for the database or one per collection (unified, per-collection)
    #[arg(long)]
    pub granularity: Option<Granularity>,

    /// Diagram renderer (local, anthropic, ollama)
    #[arg(short, long)]
    pub renderer: Option<RendererKind>,

    /// Model used by the LLM renderers
    #[arg(long)]
    pub model: Option<String>,

    /// Compare sampled values to settle ambiguous relationship targets
    #[arg(long)]
    pub value_overlap: bool,

    /// Run everything but do not write files
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 if any collection was skipped or any diagram failed
    #[arg(long)]
    pub strict: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Handle the `generate` command
pub async fn handle_generate(args: &GenerateArgs) -> Result<(), CliError> {
    let mut config = args.source.load_config()?.with_dry_run(args.dry_run);
    if let Some(format) = args.format {
        config = config.with_format(format);
    }
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(granularity) = args.granularity {
        config.output.granularity = granularity;
    }
    if let Some(kind) = args.renderer {
        config.renderer.kind = kind;
    }
    if let Some(model) = &args.model {
        if config.renderer.kind == RendererKind::Local {
            return Err(CliError::InvalidArgument(
                "--model requires --renderer anthropic or ollama".to_string(),
            ));
        }
        config.renderer.model = model.clone();
    }
    if args.value_overlap {
        config.relationships.value_overlap = true;
    }

    let generator = SchemaGenerator::from_config(config).await?;
    let report = generator.run().await?;

    if args.json {
        output::print_json(&report)?;
    } else {
        report.print_summary();
    }

    if args.strict && !report.is_success() {
        return Err(CliError::Incomplete {
            skipped: report.skipped.len(),
            failed: report.failed.len(),
        });
    }
    Ok(())
}
