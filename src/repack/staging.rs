// src/repack/staging.rs

//! Scoped staging directories
//!
//! Each repack owns two private directories: one holding the extracted
//! archive and one holding the rebuilt archive before it is placed. Both are
//! removed when the handle is dropped, on every exit path.

use crate::error::{Error, Result};
use std::path::Path;
use tempfile::TempDir;

/// What a staging directory is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingPurpose {
    /// Extracted archive contents
    Extraction,
    /// Rebuilt archive awaiting placement
    Build,
}

impl StagingPurpose {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Extraction => "cbrxz-x-",
            Self::Build => "cbrxz-b-",
        }
    }
}

/// Uniquely named directory that is deleted on drop
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Allocate a fresh staging directory in the system temp location
    pub fn acquire(purpose: StagingPurpose) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(purpose.prefix())
            .tempdir()
            .map_err(Error::Staging)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
