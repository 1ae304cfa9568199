//! `docschema infer`

use clap::Args;
use docschema_core::pipeline::{RendererKind, SchemaGenerator};

use super::SourceArgs;
use crate::error::CliError;
use crate::output;

#[derive(Args, Debug, Clone)]
pub struct InferArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print schemas as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Handle the `infer` command
pub async fn handle_infer(args: &InferArgs) -> Result<(), CliError> {
    let mut config = args.source.load_config()?;
    config.renderer.kind = RendererKind::Local;

    let generator = SchemaGenerator::from_config(config).await?;
    let (schemas, skipped) = generator.infer_schemas().await?;

    if args.json {
        output::print_json(&schemas)?;
    } else {
        for (i, schema) in schemas.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", output::format_schema(schema));
        }
    }
    output::print_skipped(&skipped);
    Ok(())
}
