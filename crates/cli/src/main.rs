//! docschema - ER diagrams for document databases

mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::{GenerateArgs, InferArgs, RelationshipsArgs};

/// Infer collection schemas from sampled documents and draw them as a
/// Mermaid ER diagram
#[derive(Parser, Debug)]
#[command(name = "docschema", author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sample, infer, detect relationships and write the diagram
    Generate(GenerateArgs),
    /// Print the inferred schema of each collection
    Infer(InferArgs),
    /// Print the relationships detected between collections
    Relationships(RelationshipsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&logging::Config::from_verbosity(cli.verbose, cli.log_json));

    let result = match &cli.command {
        Commands::Generate(args) => commands::generate::handle_generate(args).await,
        Commands::Infer(args) => commands::infer::handle_infer(args).await,
        Commands::Relationships(args) => {
            commands::relationships::handle_relationships(args).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err.user_message());
            ExitCode::from(err.exit_code())
        }
    }
}
