// src/lib.rs

//! cbrxz: comic book archive normalizer
//!
//! Walks a source tree and reproduces it under a destination directory with
//! every comic book in a predictable container:
//!
//! - `.cbr` / `.rar` are extracted and rebuilt as deterministic `.cbz`
//! - `.zip` is copied as `.cbz`, `.7z` as `.cb7`
//! - `.cbz`, `.cb7`, `.pdf` and `.epub` are copied unchanged
//!
//! # Architecture
//!
//! - `walker` builds the ordered work list; `classify` decides per file
//! - `driver` runs items one at a time and never lets one failure stop the run
//! - `repack` owns extraction, junk filtering and archive construction
//! - `fsops` places every output atomically
//! - Reporting goes through an explicit `Diagnostics` sink, never a global

pub mod classify;
pub mod diagnostics;
pub mod driver;
mod error;
pub mod fsops;
pub mod junk;
pub mod repack;
pub mod walker;

pub use classify::{
    AcceptAll, BookFilter, Classifier, ContainerKind, Decision, GlobExclude, SkipReason,
    BOOK_TYPES, RAR_TYPES,
};
pub use diagnostics::{Diagnostics, Level, RecordingDiagnostics, TracingDiagnostics};
pub use driver::{Driver, ItemOutcome, ItemReport, RunOptions, RunPlan, RunSummary};
pub use error::{Error, Result};
pub use junk::is_junk;
pub use repack::{
    ExtractionOutcome, RarExtractor, RepackOptions, RepackOutcome, Repacker, Signature,
    UnrarExtractor,
};
pub use walker::{discover, Discovery, SourceItem};
