//! Command-line sandbox for gameplay content.
//!
//! Loads a content directory, then either lists what it defines or runs a
//! scripted duel through the simulation and prints the outcome.
//! Run with: `cargo run -p gameplay-sandbox -- <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Duel, Inspect};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Gameplay sandbox
#[derive(Parser)]
#[command(name = "gameplay-sandbox")]
#[command(about = "Inspect gameplay content and run scripted encounters", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// List tags, attributes, profiles, effects and abilities
    Inspect(Inspect),

    /// Run a scripted duel between two profiles
    Duel(Duel),
}

fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(cmd) => cmd.execute(),
        Command::Duel(cmd) => cmd.execute(),
    }
}

/// Logs go to stderr so stdout stays clean for `--format json`.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
