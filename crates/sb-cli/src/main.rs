//! CLI frontend for the Spielbuch story engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sb",
    about = "Spielbuch — a branching story engine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a story file: graph structure and all condition expressions
    Check {
        /// Story JSON file
        file: PathBuf,
    },

    /// Show story metadata and graph statistics
    Info {
        /// Story JSON file
        file: PathBuf,
    },

    /// Play a story interactively in the terminal
    Play {
        /// Story JSON file
        file: PathBuf,

        /// Text reveal speed in [0, 1]; 1.0 shows lines instantly
        #[arg(long, default_value = "1.0")]
        speed: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::Info { file } => commands::info::run(&file),
        Commands::Play { file, speed } => commands::play::run(&file, speed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
