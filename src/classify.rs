// src/classify.rs

//! Path classification
//!
//! Decides, from a file name alone, what the pipeline does with a file:
//! repack it, copy it under a comic-book extension, copy it untouched, or
//! leave it alone. Nothing here touches the filesystem.

use crate::error::{Error, Result};
use glob::Pattern;
use std::path::Path;

/// Recognized container extensions (lowercase, without the dot)
pub const BOOK_TYPES: &[&str] = &["cbr", "rar", "cbz", "zip", "cb7", "7z", "pdf", "epub"];

/// Extensions of the RAR family
pub const RAR_TYPES: &[&str] = &["cbr", "rar"];

/// Container family of a recognized file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `.cbr` / `.rar`
    Rar,
    /// `.cbz` / `.zip`
    Zip,
    /// `.cb7` / `.7z`
    SevenZip,
    /// `.pdf` / `.epub`
    Document,
}

impl ContainerKind {
    /// Detect the container family from an extension
    ///
    /// Matching is case-insensitive and tolerates a leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = normalize_extension(extension);
        match ext.as_str() {
            "cbr" | "rar" => Some(Self::Rar),
            "cbz" | "zip" => Some(Self::Zip),
            "cb7" | "7z" => Some(Self::SevenZip),
            "pdf" | "epub" => Some(Self::Document),
            _ => None,
        }
    }
}

/// Why a file was left out of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Extension is not a recognized container
    Unsupported,
    /// Recognized, but `--rar-only` restricts the batch to RAR-family files
    NotRar,
    /// Vetoed by the name-exclusion hook
    Excluded,
}

/// What the pipeline does with one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Extract and rebuild as `.cbz`
    ConvertRarLike,
    /// Byte copy under a new extension
    RenameCopy { extension: &'static str },
    /// Byte copy with the original name
    CopyVerbatim,
    /// Take no action
    Skip(SkipReason),
}

impl Decision {
    /// Destination file name for a source file name under this decision
    ///
    /// Returns `None` for skipped files.
    pub fn destination_name(&self, file_name: &str) -> Option<String> {
        match self {
            Self::ConvertRarLike => Some(replace_extension(file_name, "cbz")),
            Self::RenameCopy { extension } => Some(replace_extension(file_name, extension)),
            Self::CopyVerbatim => Some(file_name.to_string()),
            Self::Skip(_) => None,
        }
    }
}

/// Name-based exclusion hook
///
/// Implementations may veto any file regardless of its extension.
pub trait BookFilter: Send + Sync {
    /// Return true to drop the file from the batch
    fn excludes(&self, file_name: &str) -> bool;
}

/// Filter that excludes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl BookFilter for AcceptAll {
    fn excludes(&self, _file_name: &str) -> bool {
        false
    }
}

/// Filter that excludes file names matching any of a set of glob patterns
#[derive(Debug, Clone, Default)]
pub struct GlobExclude {
    patterns: Vec<Pattern>,
}

impl GlobExclude {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| Error::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl BookFilter for GlobExclude {
    fn excludes(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }
}

/// Classifier configured with the batch-level restrictions
pub struct Classifier {
    filter: Box<dyn BookFilter>,
    rar_only: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Box::new(AcceptAll))
    }
}

impl Classifier {
    pub fn new(filter: Box<dyn BookFilter>) -> Self {
        Self {
            filter,
            rar_only: false,
        }
    }

    /// Restrict accepted files to the RAR family
    pub fn with_rar_only(mut self, rar_only: bool) -> Self {
        self.rar_only = rar_only;
        self
    }

    /// Classify a file from its extension and name
    ///
    /// Order: extension, then the RAR-only restriction, then the exclusion hook.
    pub fn classify(&self, extension: &str, file_name: &str) -> Decision {
        let Some(kind) = ContainerKind::from_extension(extension) else {
            return Decision::Skip(SkipReason::Unsupported);
        };

        if self.rar_only && kind != ContainerKind::Rar {
            return Decision::Skip(SkipReason::NotRar);
        }

        if self.filter.excludes(file_name) {
            return Decision::Skip(SkipReason::Excluded);
        }

        match normalize_extension(extension).as_str() {
            "cbr" | "rar" => Decision::ConvertRarLike,
            "zip" => Decision::RenameCopy { extension: "cbz" },
            "7z" => Decision::RenameCopy { extension: "cb7" },
            _ => Decision::CopyVerbatim,
        }
    }

    /// Classify a path by its final component
    pub fn classify_path(&self, path: &Path) -> Decision {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.classify(&extension_of(path), &file_name)
    }
}

/// Lowercase extension of a path, without the dot (empty when absent)
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

fn replace_extension(file_name: &str, extension: &str) -> String {
    Path::new(file_name)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}
