// src/driver.rs

//! Run orchestration
//!
//! Validates the run's paths, discovers the work list, dispatches each item
//! according to its classification and accumulates a `RunSummary`. A failure
//! while processing one item is recorded and the loop moves on; only
//! validation failures and an uncreatable destination directory end a run
//! early.

use crate::classify::{AcceptAll, BookFilter, Classifier, Decision, GlobExclude, SkipReason};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::fsops::{absolute_path, ensure_dir, place_copy, should_write};
use crate::repack::{
    RarExtractor, RepackOptions, RepackOutcome, Repacker, Signature, UnrarExtractor,
};
use crate::walker::{discover, SourceItem};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one run, independent of how they were parsed
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Base for relative destination paths; must be the source or an ancestor
    pub root: Option<PathBuf>,
    /// Only process `.cbr` / `.rar` files
    pub rar_only: bool,
    /// Overwrite existing destination files
    pub replace: bool,
    /// Log the plan without writing anything
    pub dry_run: bool,
    /// Glob patterns; matching file names are left out of the batch
    pub exclude: Vec<String>,
}

/// Validated, absolute paths for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Prefix stripped from source paths to form destination-relative paths
    pub rel_base: PathBuf,
}

/// What happened to one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// RAR-family archive rebuilt as `.cbz`
    Converted { members: usize, warnings: Vec<String> },
    /// Byte copy, possibly under a new extension
    Copied,
    /// Destination existed and replace was off
    AlreadyPresent,
    /// RAR-family name, other content; copied verbatim when not a dry run
    FormatMismatch { detected: Signature, copied: bool },
    /// Archive damaged; nothing was written
    Corrupted(String),
    /// Dry run: the item would have been written
    Planned { warnings: Vec<String> },
    /// Single-file source with an unusable extension or filter veto
    Unsupported,
    /// Unexpected failure while processing the item
    Failed(String),
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Corrupted(_) | Self::Failed(_))
    }

    pub fn has_warnings(&self) -> bool {
        match self {
            Self::Converted { warnings, .. } | Self::Planned { warnings } => !warnings.is_empty(),
            _ => false,
        }
    }
}

impl From<RepackOutcome> for ItemOutcome {
    fn from(outcome: RepackOutcome) -> Self {
        match outcome {
            RepackOutcome::Converted { members, warnings } => Self::Converted { members, warnings },
            RepackOutcome::AlreadyPresent => Self::AlreadyPresent,
            RepackOutcome::FormatMismatch { detected, copied } => {
                Self::FormatMismatch { detected, copied }
            }
            RepackOutcome::Corrupted { reason } => Self::Corrupted(reason),
            RepackOutcome::Planned { warnings, .. } => Self::Planned { warnings },
        }
    }
}

/// Per-item record kept in the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub outcome: ItemOutcome,
}

/// Aggregate result of a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Regular files seen under the source
    pub total_files: usize,
    /// Items in the work list
    pub books: usize,
    /// Files skipped for an unrecognized extension
    pub unsupported: usize,
    /// Recognized files removed by `--rar-only` or `--exclude`
    pub filtered: usize,
    pub dry_run: bool,
    pub items: Vec<ItemReport>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Converted { .. }))
    }

    pub fn copied(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Copied))
    }

    pub fn already_present(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::AlreadyPresent))
    }

    pub fn mismatched(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::FormatMismatch { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Planned { .. }))
    }

    pub fn warnings(&self) -> usize {
        self.count(ItemOutcome::has_warnings)
    }

    pub fn failures(&self) -> Vec<&ItemReport> {
        self.items
            .iter()
            .filter(|i| i.outcome.is_failure())
            .collect()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.dry_run { "Dry run summary" } else { "Run summary" };
        writeln!(f, "{}:", title)?;
        writeln!(f, "  Files seen:       {}", self.total_files)?;
        writeln!(f, "  Books:            {}", self.books)?;
        if self.dry_run {
            writeln!(f, "  Planned:          {}", self.planned())?;
        } else {
            writeln!(f, "  Converted:        {}", self.converted())?;
            writeln!(f, "  Copied:           {}", self.copied())?;
        }
        writeln!(f, "  Already present:  {}", self.already_present())?;
        writeln!(f, "  Format mismatch:  {}", self.mismatched())?;
        writeln!(f, "  Warnings:         {}", self.warnings())?;

        let failures = self.failures();
        write!(f, "  Failed:           {}", failures.len())?;
        for report in failures {
            let reason = match &report.outcome {
                ItemOutcome::Corrupted(reason) => format!("corrupted ({})", reason),
                ItemOutcome::Failed(reason) => reason.clone(),
                _ => continue,
            };
            write!(f, "\n    {}: {}", report.source.display(), reason)?;
        }
        Ok(())
    }
}

/// Sequential conversion driver
pub struct Driver {
    options: RunOptions,
    repacker: Repacker,
}

impl Driver {
    /// Create a driver using the `unrar`-backed extractor
    pub fn new(options: RunOptions) -> Self {
        Self::with_extractor(options, Box::new(UnrarExtractor::new()))
    }

    /// Create a driver with a specific RAR extraction backend
    pub fn with_extractor(options: RunOptions, extractor: Box<dyn RarExtractor>) -> Self {
        let repacker = Repacker::new(
            extractor,
            RepackOptions {
                replace: options.replace,
                dry_run: options.dry_run,
            },
        );
        Self { options, repacker }
    }

    /// Validate paths and compute the relative base
    ///
    /// Paths are made absolute without resolving symlinks. Nothing is
    /// written until every check has passed; the destination is then
    /// created unless this is a dry run.
    pub fn prepare(&self, source: &Path, destination: &Path) -> Result<RunPlan> {
        let not_found = || Error::SourceNotFound(source.to_path_buf());
        let source = absolute_path(source).map_err(|_| not_found())?;
        if !source.exists() {
            return Err(not_found());
        }

        let destination = absolute_path(destination).map_err(|e| Error::io(destination, e))?;
        if destination.is_file() {
            return Err(Error::DestinationIsFile(destination));
        }

        let rel_base = match &self.options.root {
            Some(root) => {
                let not_ancestor = || Error::RootNotAncestor {
                    source_path: source.clone(),
                    root: root.clone(),
                };
                let root = absolute_path(root).map_err(|_| not_ancestor())?;
                if !source.starts_with(&root) {
                    return Err(not_ancestor());
                }
                root
            }
            None if source.is_dir() => source.clone(),
            None => source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source.clone()),
        };

        if !destination.exists() && !self.options.dry_run {
            fs::create_dir_all(&destination).map_err(|e| Error::DestinationNotCreatable {
                path: destination.clone(),
                source: e,
            })?;
        }

        Ok(RunPlan {
            source,
            destination,
            rel_base,
        })
    }

    fn classifier(&self) -> Result<Classifier> {
        let filter: Box<dyn BookFilter> = if self.options.exclude.is_empty() {
            Box::new(AcceptAll)
        } else {
            Box::new(GlobExclude::new(&self.options.exclude)?)
        };
        Ok(Classifier::new(filter).with_rar_only(self.options.rar_only))
    }

    /// Process every eligible file under `source` into `destination`
    pub fn run(
        &self,
        source: &Path,
        destination: &Path,
        diag: &dyn Diagnostics,
    ) -> Result<RunSummary> {
        let classifier = self.classifier()?;
        let plan = self.prepare(source, destination)?;

        let discovery = discover(&plan.source, &plan.rel_base, &classifier, diag);
        let mut summary = RunSummary {
            total_files: discovery.total_files,
            books: discovery.items.len(),
            unsupported: discovery.unsupported,
            filtered: discovery.filtered,
            dry_run: self.options.dry_run,
            items: Vec::with_capacity(discovery.items.len()),
        };

        diag.info(&format!(
            "beginning - {} books of {} files.",
            summary.books, summary.total_files
        ));

        for item in &discovery.items {
            let report = self.process(item, &plan, diag)?;
            summary.items.push(report);
        }

        diag.info(&format!(
            "completed - {} books of {} files.",
            summary.books, summary.total_files
        ));

        Ok(summary)
    }

    /// Handle one item; only destination directory creation failures escape
    fn process(
        &self,
        item: &SourceItem,
        plan: &RunPlan,
        diag: &dyn Diagnostics,
    ) -> Result<ItemReport> {
        diag.info(&format!("EVENT: processing {}", item.path.display()));

        let Some(dest_name) = item.decision.destination_name(&item.file_name()) else {
            match item.decision {
                Decision::Skip(SkipReason::Unsupported) => diag.info(&format!(
                    "{} is not a supported filetype.",
                    item.path.display()
                )),
                Decision::Skip(reason) => {
                    diag.info(&format!("{} skipped ({:?})", item.path.display(), reason))
                }
                _ => {}
            }
            return Ok(ItemReport {
                source: item.path.clone(),
                destination: None,
                outcome: ItemOutcome::Unsupported,
            });
        };

        let dest_dir = match item.relative.parent() {
            Some(parent) => plan.destination.join(parent),
            None => plan.destination.clone(),
        };
        if !dest_dir.is_dir() {
            diag.info(&format!("EVENT: making {}", dest_dir.display()));
            if !self.options.dry_run {
                ensure_dir(&dest_dir)?;
            }
        }
        let destination = dest_dir.join(dest_name);

        let result = match item.decision {
            Decision::ConvertRarLike => self
                .repacker
                .repack(&item.path, &destination, diag)
                .map(ItemOutcome::from),
            Decision::RenameCopy { .. } | Decision::CopyVerbatim => {
                self.copy_item(&item.path, &destination, diag)
            }
            Decision::Skip(_) => Ok(ItemOutcome::Unsupported),
        };

        let outcome = result.unwrap_or_else(|e| {
            diag.error(&format!(
                "ERROR: failed to process {}: {}",
                item.path.display(),
                e
            ));
            ItemOutcome::Failed(e.to_string())
        });

        Ok(ItemReport {
            source: item.path.clone(),
            destination: Some(destination),
            outcome,
        })
    }

    fn copy_item(
        &self,
        source: &Path,
        destination: &Path,
        diag: &dyn Diagnostics,
    ) -> Result<ItemOutcome> {
        if !should_write(destination, self.options.replace) {
            diag.debug(&format!(
                "{} already exists, skipping",
                destination.display()
            ));
            return Ok(ItemOutcome::AlreadyPresent);
        }

        if self.options.dry_run {
            diag.info(&format!(
                "EVENT: would copy {} -> {}",
                source.display(),
                destination.display()
            ));
            return Ok(ItemOutcome::Planned {
                warnings: Vec::new(),
            });
        }

        diag.info(&format!(
            "EVENT: copying {} to {}",
            source.display(),
            destination.parent().unwrap_or(destination).display()
        ));
        place_copy(source, destination)?;
        Ok(ItemOutcome::Copied)
    }
}
