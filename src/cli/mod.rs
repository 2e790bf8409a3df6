// src/cli/mod.rs
//! CLI definitions for cbrxz
//!
//! A single command: normalize every comic book archive under `SOURCE` into
//! the mirrored tree at `DESTINATION`. Parsed arguments are lowered into
//! `RunOptions` so the library never sees clap types.

use cbrxz::RunOptions;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cbrxz")]
#[command(version)]
#[command(
    about = "Normalize comic book archives: repack CBR/RAR as CBZ, copy everything else",
    long_about = None
)]
pub struct Cli {
    /// Source file or directory
    pub source: PathBuf,

    /// Destination directory (created if absent)
    pub destination: PathBuf,

    /// Base directory for destination paths; must contain SOURCE
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Only process .cbr and .rar files
    #[arg(short = 'R', long)]
    pub rar_only: bool,

    /// Overwrite files that already exist in the destination
    #[arg(short = 'F', long)]
    pub replace: bool,

    /// Log what would be done without writing anything
    #[arg(short = 'N', long)]
    pub dry_run: bool,

    /// Skip files whose name matches this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Logging verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "WARN")]
    Warning,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            root: self.root.clone(),
            rar_only: self.rar_only,
            replace: self.replace,
            dry_run: self.dry_run,
            exclude: self.exclude.clone(),
        }
    }
}
