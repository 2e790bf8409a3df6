// src/main.rs

use anyhow::{Context, Result};
use cbrxz::{Driver, RunSummary, TracingDiagnostics};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, LogLevel};

/// Exit code for usage and validation failures
const EXIT_USAGE: u8 = 2;

fn init_logging(level: LogLevel) {
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let driver = Driver::new(cli.run_options());
    let diag = TracingDiagnostics::new();
    driver
        .run(&cli.source, &cli.destination, &diag)
        .with_context(|| format!("Failed to process {}", cli.source.display()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(&cli) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(err) = e.downcast_ref::<cbrxz::Error>()
                && err.is_validation()
            {
                eprintln!("{}", err);
                return ExitCode::from(EXIT_USAGE);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
