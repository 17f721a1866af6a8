//! keyhaul - one-shot Redis keyspace migration.
//!
//! Copies every key from a source instance to a destination instance,
//! preserving serialized values and remaining expiries.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use clap::Parser;
use keyhaul::{MigrationConfig, MigrationPipeline};
use tracing::error;

/// keyhaul - copy a whole Redis keyspace between instances
#[derive(Parser, Debug)]
#[command(name = "keyhaul")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source Redis URL (e.g. redis://127.0.0.1:6379/0)
    #[arg(long)]
    from: String,

    /// Destination Redis URL (e.g. redis://127.0.0.1:6379/1)
    #[arg(long)]
    to: String,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = MigrationConfig::new(args.from, args.to);

    let pipeline = match MigrationPipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match pipeline.run().await {
        Ok(summary) => {
            println!("Sync done: {}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Migration failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
