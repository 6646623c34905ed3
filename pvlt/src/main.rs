//! pvlt - command-line tools for PVL labels.
//!
//! Two subcommands cover the day-to-day chores of working with
//! planetary-science labels: `translate` re-emits a label in another
//! dialect (or JSON), and `validate` reports which dialects can load
//! and encode each given file.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::translate::{run_translate, TranslateArgs};
use commands::validate::{run_validate, ValidateArgs};

/// Tools for reading, converting, and checking PVL labels.
#[derive(Parser, Debug)]
#[command(name = "pvlt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tools for reading, converting, and checking PVL labels", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v shows error details, -vv debug logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the pvlt CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a label to another dialect or to JSON
    ///
    /// The input is read with the permissive Omni dialect, so malformed
    /// legacy labels convert too as long as they parse at all.
    Translate(TranslateArgs),

    /// Report which dialects can load and encode each label
    Validate(ValidateArgs),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Translate(args) => run_translate(args),
        Commands::Validate(args) => run_validate(args, cli.verbose),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
