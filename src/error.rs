// src/error.rs

//! Error types for cbrxz
//!
//! Only pre-run validation failures and unexpected I/O conditions are
//! represented here. Per-item problems (corrupt archives, format mismatches)
//! are outcomes, not errors, and never leave the Driver's item loop.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Destination must be a directory (not a file): {}", .0.display())]
    DestinationIsFile(PathBuf),

    #[error("Cannot create destination directory: {} ({source})", path.display())]
    DestinationNotCreatable { path: PathBuf, source: io::Error },

    #[error("{} is not the child of {}", source_path.display(), root.display())]
    RootNotAncestor { source_path: PathBuf, root: PathBuf },

    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to prepare staging directory: {0}")]
    Staging(io::Error),
}

impl Error {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error belongs to the pre-run validation class
    ///
    /// These map to the usage exit code rather than a generic failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_)
                | Self::DestinationIsFile(_)
                | Self::DestinationNotCreatable { .. }
                | Self::RootNotAncestor { .. }
                | Self::InvalidPattern { .. }
        )
    }
}

/// Result type for cbrxz operations
pub type Result<T> = std::result::Result<T, Error>;
