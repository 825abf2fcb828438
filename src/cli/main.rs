//! schema-generator CLI
//!
//! Command-line interface for inferring schemas from JSON and XML documents

use clap::Parser;
use schema_generator::cli::commands::{handle_classify, handle_infer};
use schema_generator::cli::{Cli, Commands};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG refines the default level
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let result = match &cli.command {
        Commands::Infer(args) => handle_infer(args),
        Commands::Classify { values } => {
            handle_classify(values);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
