//! patvet CLI tool.
//!
//! Usage:
//! ```bash
//! patvet check [--choke N] [--format text|json] [--root PATH]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Pattern-driven linter for Rust projects
#[derive(Parser)]
#[command(name = "patvet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured checkers over a project
    Check {
        /// Stop after this many diagnostics (overrides `choke` in the config)
        #[arg(long)]
        choke: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Project root (default: current directory)
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Output format for diagnostics.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Column-aligned text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            choke,
            format,
            root,
        } => commands::check::run(&root, choke, format, cli.config.as_deref()),
    }
}
