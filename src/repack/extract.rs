// src/repack/extract.rs

//! RAR extraction into a staging directory
//!
//! The codec is a black box behind `RarExtractor`. Whatever happens inside
//! it is reported as one of four outcomes; only environment failures (the
//! staging directory cannot be written, the source cannot be read) come back
//! as errors.

use crate::error::{Error, Result};
use std::io;
use std::path::{Component, Path};
use unrar::error::{Code, UnrarError};
use unrar::Archive;

/// Result of extracting one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Every entry was extracted
    Success,
    /// Extraction completed, but some entries were lost
    PartialWarning(Vec<String>),
    /// Checksum mismatch or structural damage; nothing usable was produced
    Corrupted(String),
    /// The file is not a RAR archive at all
    NotThisFormat,
}

/// Extracts every entry of a RAR-family archive into a directory
pub trait RarExtractor: Send + Sync {
    fn extract_all(&self, archive: &Path, destination: &Path) -> Result<ExtractionOutcome>;
}

/// Production extractor backed by the `unrar` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct UnrarExtractor;

impl UnrarExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl RarExtractor for UnrarExtractor {
    fn extract_all(&self, archive: &Path, destination: &Path) -> Result<ExtractionOutcome> {
        let mut warnings = Vec::new();

        let mut cursor = match Archive::new(archive).open_for_processing() {
            Ok(open) => open,
            Err(e) => return map_unrar_error(archive, destination, e),
        };

        loop {
            let header = match cursor.read_header() {
                Ok(Some(header)) => header,
                Ok(None) => break,
                Err(e) => return map_unrar_error(archive, destination, e),
            };

            let entry = header.entry();
            let name = entry.filename.to_string_lossy().into_owned();

            let step = if entry.is_directory() {
                header.skip()
            } else if entry.is_encrypted() {
                warnings.push(format!("{}: encrypted entry skipped", name));
                header.skip()
            } else if !is_contained(&entry.filename) {
                warnings.push(format!("{}: unsafe entry path skipped", name));
                header.skip()
            } else {
                header.extract_with_base(destination)
            };

            cursor = match step {
                Ok(next) => next,
                Err(e) => return map_unrar_error(archive, destination, e),
            };
        }

        if warnings.is_empty() {
            Ok(ExtractionOutcome::Success)
        } else {
            Ok(ExtractionOutcome::PartialWarning(warnings))
        }
    }
}

/// Whether an entry path stays inside the extraction root
pub fn is_contained(path: &Path) -> bool {
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

fn map_unrar_error(
    archive: &Path,
    destination: &Path,
    err: UnrarError,
) -> Result<ExtractionOutcome> {
    match err.code {
        Code::BadData => Ok(ExtractionOutcome::Corrupted(format!(
            "checksum mismatch ({})",
            err
        ))),
        Code::MissingPassword | Code::BadPassword => Ok(ExtractionOutcome::Corrupted(format!(
            "archive requires a password ({})",
            err
        ))),
        Code::EOpen | Code::ERead => Err(Error::io(archive, io::Error::other(err.to_string()))),
        Code::ECreate | Code::EWrite | Code::EClose => {
            Err(Error::io(destination, io::Error::other(err.to_string())))
        }
        _ => Ok(ExtractionOutcome::Corrupted(err.to_string())),
    }
}
