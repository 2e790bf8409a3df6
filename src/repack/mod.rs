// src/repack/mod.rs
//! RAR-family to ZIP repacking
//!
//! Takes one `.cbr`/`.rar` file and produces a `.cbz` beside its mirrored
//! destination path:
//!
//! 1. Sniff the leading bytes. Anything that is not RAR (most often a ZIP
//!    carrying the wrong extension) is copied verbatim under the `.cbz` name.
//! 2. Extract into a private staging directory through a `RarExtractor`.
//! 3. Collect entries, drop junk, sort by internal path.
//! 4. Write a STORE-mode ZIP into a second staging directory.
//! 5. Place the result atomically at the destination.
//!
//! Both staging directories are released on every exit path. A corrupted
//! archive is an outcome, never an error; only environment failures
//! (unwritable staging, unreadable source) are returned as `Err`.

pub mod builder;
pub mod detect;
pub mod extract;
pub mod staging;

pub use builder::{collect_entries, write_archive, ArchiveEntry, EntrySet, COMIC_INFO};
pub use detect::Signature;
pub use extract::{ExtractionOutcome, RarExtractor, UnrarExtractor};
pub use staging::{StagingDir, StagingPurpose};

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::fsops::{place_copy, should_write};
use std::path::Path;

/// Options for a repack
#[derive(Debug, Clone, Copy, Default)]
pub struct RepackOptions {
    /// Overwrite an existing destination
    pub replace: bool,
    /// Plan only; nothing is written to the destination
    pub dry_run: bool,
}

/// What happened to one RAR-family source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepackOutcome {
    /// Rebuilt as a ZIP; `warnings` is non-empty when entries were lost
    Converted { members: usize, warnings: Vec<String> },
    /// Destination exists and replace is off
    AlreadyPresent,
    /// Not a RAR archive; copied verbatim under the `.cbz` name
    FormatMismatch { detected: Signature, copied: bool },
    /// Damaged archive; no destination file was produced
    Corrupted { reason: String },
    /// Dry run: the archive would be rebuilt with `members` entries
    Planned { members: usize, warnings: Vec<String> },
}

/// Converts RAR-family archives to deterministic ZIPs
pub struct Repacker {
    extractor: Box<dyn RarExtractor>,
    options: RepackOptions,
}

impl Repacker {
    /// Create a repacker with the given extraction backend
    pub fn new(extractor: Box<dyn RarExtractor>, options: RepackOptions) -> Self {
        Self { extractor, options }
    }

    /// Repack `source` into `destination`
    ///
    /// `destination` is the final `.cbz` path; its parent must exist unless
    /// this is a dry run.
    pub fn repack(
        &self,
        source: &Path,
        destination: &Path,
        diag: &dyn Diagnostics,
    ) -> Result<RepackOutcome> {
        let name = display_name(source);

        if !should_write(destination, self.options.replace) {
            diag.debug(&format!(
                "{} already exists, skipping",
                destination.display()
            ));
            return Ok(RepackOutcome::AlreadyPresent);
        }

        let signature = Signature::sniff_file(source).map_err(|e| Error::io(source, e))?;
        if !signature.is_rar() {
            return self.copy_mismatched(source, destination, signature, diag);
        }

        let extraction = StagingDir::acquire(StagingPurpose::Extraction)?;
        diag.info(&format!(
            "EVENT: extracting {} to {}",
            name,
            extraction.path().display()
        ));

        let warnings = match self.extractor.extract_all(source, extraction.path())? {
            ExtractionOutcome::Success => Vec::new(),
            ExtractionOutcome::PartialWarning(warnings) => {
                diag.warn(&format!(
                    "Non-fatal error handling {} - some data loss likely.",
                    name
                ));
                for warning in &warnings {
                    diag.debug(warning);
                }
                warnings
            }
            ExtractionOutcome::Corrupted(reason) => {
                diag.error(&format!("ERROR: corrupted archive: {}", name));
                diag.debug(&reason);
                return Ok(RepackOutcome::Corrupted { reason });
            }
            ExtractionOutcome::NotThisFormat => {
                drop(extraction);
                return self.copy_mismatched(source, destination, Signature::Unknown, diag);
            }
        };

        let set = collect_entries(extraction.path())?;
        for dropped in &set.dropped {
            diag.debug(&format!("dropping junk entry {}", dropped));
        }
        if !set.has_comic_info() {
            diag.debug(&format!("{} has no {}", name, COMIC_INFO));
        }
        if set.is_empty() {
            diag.warn(&format!("{} contains no pages", name));
        }

        if self.options.dry_run {
            diag.info(&format!(
                "EVENT: would convert {} -> {}",
                source.display(),
                destination.display()
            ));
            for entry in &set.entries {
                diag.debug(&format!("  {}", entry.relative));
            }
            return Ok(RepackOutcome::Planned {
                members: set.len(),
                warnings,
            });
        }

        let build = StagingDir::acquire(StagingPurpose::Build)?;
        let staged = build.path().join(
            destination
                .file_name()
                .ok_or_else(|| Error::io(destination, std::io::Error::other("no file name")))?,
        );
        diag.info(&format!("EVENT: making {}", staged.display()));
        write_archive(&set.entries, &staged)?;

        diag.info(&format!(
            "EVENT: copying {} to {}",
            display_name(&staged),
            destination.parent().unwrap_or(destination).display()
        ));
        place_copy(&staged, destination)?;

        Ok(RepackOutcome::Converted {
            members: set.len(),
            warnings,
        })
    }

    /// Fall back to a byte copy for a file that is not really RAR
    fn copy_mismatched(
        &self,
        source: &Path,
        destination: &Path,
        detected: Signature,
        diag: &dyn Diagnostics,
    ) -> Result<RepackOutcome> {
        let description = detected.describe();
        diag.warn(&format!(
            "Non-fatal error handling {} - {}",
            display_name(source),
            description
        ));

        if self.options.dry_run {
            diag.info(&format!(
                "EVENT: would copy {} -> {}",
                source.display(),
                destination.display()
            ));
            return Ok(RepackOutcome::FormatMismatch {
                detected,
                copied: false,
            });
        }

        diag.info(&format!(
            "EVENT: copying {} to {}",
            display_name(source),
            destination.display()
        ));
        place_copy(source, destination)?;
        Ok(RepackOutcome::FormatMismatch {
            detected,
            copied: true,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
