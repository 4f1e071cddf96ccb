//! Typify CLI: builds an input tree into the output cache through a checking
//! engine child process, optionally watching the tree for changes.

#![warn(missing_docs)]

mod build;
mod engine;

use std::process;

use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Typify: incremental compilation through an external checking engine.
#[derive(Parser, Debug)]
#[command(name = "typify", version, about = "Typify incremental compilation adapter")]
pub struct Cli {
    /// Input directory to build.
    pub input: String,

    /// Output cache directory. Defaults to `.typify/out` in the project
    /// directory.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Project directory holding `typify.toml` and `package.json`.
    /// Defaults to the current directory.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Checking engine command, overriding `[engine] command`.
    #[arg(long)]
    pub engine: Option<String>,

    /// Keep running and rebuild whenever the input tree changes.
    #[arg(short, long)]
    pub watch: bool,

    /// Polling interval of `--watch`, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub interval: u64,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a custom `typify.toml` configuration file.
    #[arg(long)]
    pub config: Option<String>,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary on stderr.
    Text,
    /// One JSON object per diagnostic on stdout.
    Json,
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    };
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: cannot install logger: {err}");
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match build::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
