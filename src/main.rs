//! isocity CLI - run, watch and inspect scripted city simulations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// isocity - A deterministic tile-grid city simulation
#[derive(Parser, Debug)]
#[command(name = "isocity")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log every intent and tick to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script of intents and print the result
    Run {
        /// Script file (.json)
        #[arg(short, long)]
        script: PathBuf,

        /// Days to simulate (default: through the last scripted day)
        #[arg(short, long)]
        days: Option<u32>,

        /// Configuration file (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Building catalog (.json, default: standard catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format: text, json, or summary
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the final state as a snapshot
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress day-by-day output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive TUI to watch a script play out
    Watch {
        /// Script file (.json)
        #[arg(short, long)]
        script: PathBuf,

        /// Day limit (default: 100)
        #[arg(short, long, default_value = "100")]
        days: u32,

        /// Configuration file (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Building catalog (.json, default: standard catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Day delay in milliseconds (default: 500)
        #[arg(long, default_value = "500")]
        speed: u64,
    },

    /// Render a saved snapshot
    Replay {
        /// Snapshot file (.json)
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Output format: ascii, summary, or json
        #[arg(short, long, default_value = "ascii")]
        format: cli::SnapshotFormat,

        /// Configuration file the city was played with (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Building catalog the city was played with (.json)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Validate configuration, catalog and script files
    Validate {
        /// Configuration file (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Building catalog (.json)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Script file (.json)
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The TUI owns the terminal, so stay silent there unless asked.
    let default_level = match args.command {
        Commands::Watch { .. } => "off",
        _ => "warn",
    };
    init_tracing(args.verbose, default_level);

    let result = match args.command {
        Commands::Run {
            script,
            days,
            config,
            catalog,
            format,
            save,
            quiet,
        } => cli::run::execute(
            &script,
            days,
            config.as_deref(),
            catalog.as_deref(),
            format,
            save.as_deref(),
            quiet,
        ),

        Commands::Watch {
            script,
            days,
            config,
            catalog,
            speed,
        } => cli::watch::execute(&script, days, config.as_deref(), catalog.as_deref(), speed),

        Commands::Replay {
            snapshot,
            format,
            config,
            catalog,
        } => cli::replay::execute(&snapshot, format, config.as_deref(), catalog.as_deref()),

        Commands::Validate {
            config,
            catalog,
            script,
        } => cli::validate::execute(config.as_deref(), catalog.as_deref(), script.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
