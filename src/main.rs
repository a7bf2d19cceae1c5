/*!
The `cq-engine` command-line front-end (§4.12): two subcommands, `minimize` and `evaluate`,
wrapping the two entry points of [`cq_engine::runtime`].

 */

use clap::{Parser, Subcommand};
use cq_engine::runtime::{evaluate_file, minimize_file};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "cq-engine", about = "Conjunctive query minimization and evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the core of a conjunctive query.
    Minimize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Plan and evaluate a conjunctive query against an on-disk database.
    Evaluate {
        #[arg(long)]
        database: PathBuf,
        #[arg(long)]
        query: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

// ------------------------------------------------------------------------------------------------
// Entry Point
// ------------------------------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Minimize { input, output } => minimize_file(&input, &output),
        Command::Evaluate { database, query, output } => evaluate_file(&database, &query, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
