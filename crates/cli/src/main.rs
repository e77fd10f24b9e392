//! `pocketfx`: parse, resolve and classify card effect text from the terminal.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Classify, Parse, Resolve, Status};
use pocketfx_data::load_engine_config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pocketfx")]
#[command(about = "Card effect parsing and resolution", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine config JSON; defaults apply when the file does not exist
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Show the descriptors a text parses into, in execution order
    Parse(Parse),

    /// Execute a text against two fresh combatants and print the result as JSON
    Resolve(Resolve),

    /// Parser coverage over a card file or a directory of card files
    Classify(Classify),

    /// Run between-turn processing for one special condition
    Status(Status),
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_engine_config(path)?,
        None => Default::default(),
    };

    match cli.command {
        Command::Parse(cmd) => cmd.execute(config),
        Command::Resolve(cmd) => cmd.execute(config),
        Command::Classify(cmd) => cmd.execute(),
        Command::Status(cmd) => cmd.execute(config),
    }
}
