// src/fsops.rs

//! Destination-side filesystem operations
//!
//! Every file that lands in the destination tree goes through `place_copy`:
//! the bytes are written to a temporary file beside the target, given the
//! source's permissions and modification time, and then renamed over the
//! final path. A reader of the destination tree never sees a partial file.

use crate::error::{Error, Result};
use filetime::FileTime;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Whether a write to `destination` is allowed under the replace policy
///
/// An existing file is only overwritten when `replace` is set.
pub fn should_write(destination: &Path, replace: bool) -> bool {
    replace || !destination.is_file()
}

/// Absolute form of `path` with `.` and `..` resolved lexically
///
/// Symlinks are not resolved, so a path reached through a link keeps the
/// prefix it was named with.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Create a destination directory (and parents) if it does not exist
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Copy `source` to `destination` atomically, preserving metadata
///
/// The parent of `destination` must already exist. An existing
/// `destination` is replaced; callers apply the replace policy first.
pub fn place_copy(source: &Path, destination: &Path) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let metadata = fs::metadata(source).map_err(|e| Error::io(source, e))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".cbrxz-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| Error::io(parent, e))?;

    let mut input = File::open(source).map_err(|e| Error::io(source, e))?;
    io::copy(&mut input, staged.as_file_mut()).map_err(|e| Error::io(destination, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| Error::io(destination, e))?;

    // Temp files are created owner-only; carry the source mode across
    fs::set_permissions(staged.path(), metadata.permissions())
        .map_err(|e| Error::io(destination, e))?;

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(staged.path(), atime, mtime)
        .map_err(|e| Error::io(destination, e))?;

    staged
        .persist(destination)
        .map_err(|e| Error::io(destination, e.error))?;

    Ok(())
}
