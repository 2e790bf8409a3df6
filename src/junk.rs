// src/junk.rs

//! Junk entry filter for repacked archives
//!
//! Platform noise (thumbnail caches, Finder metadata, resource-fork
//! directories) is dropped while rebuilding an archive. Plain copies are
//! never filtered.

/// Base names that are always junk, wherever they appear
pub const JUNK_FILES: &[&str] = &["Thumbs.db", ".DS_Store"];

/// Resource-fork directory; anything beneath it is junk
pub const RESOURCE_FORK_DIR: &str = "__MACOSX";

/// Check whether an archive-internal path is noise
///
/// The path is trimmed and normalized to forward slashes first. Base-name
/// matches and the resource-fork segment match are case-sensitive.
pub fn is_junk(entry_path: &str) -> bool {
    let normalized = entry_path.trim().replace('\\', "/");

    let mut segments = normalized.split('/').filter(|s| !s.is_empty()).peekable();
    while let Some(segment) = segments.next() {
        if segment == RESOURCE_FORK_DIR {
            return true;
        }
        if segments.peek().is_none() && JUNK_FILES.contains(&segment) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_junk_base_names() {
        assert!(is_junk("Thumbs.db"));
        assert!(is_junk(".DS_Store"));
        assert!(is_junk("pages/deep/Thumbs.db"));
        assert!(is_junk("a\\b\\.DS_Store"));
    }

    #[test]
    fn test_resource_fork_anywhere() {
        assert!(is_junk("__MACOSX/foo.txt"));
        assert!(is_junk("sub/__MACOSX/foo.txt"));
        assert!(is_junk("sub/__MACOSX/._001.jpg"));
        assert!(is_junk("  __MACOSX/x.jpg  "));
    }

    #[test]
    fn test_normal_entries_kept() {
        assert!(!is_junk("pages/001.jpg"));
        assert!(!is_junk("ComicInfo.xml"));
        assert!(!is_junk("thumbs.db"));
        assert!(!is_junk("__macosx/foo.txt"));
        assert!(!is_junk("not__MACOSX/foo.txt"));
        assert!(!is_junk("Thumbs.db.jpg"));
    }

    #[test]
    fn test_junk_name_as_directory_is_not_junk() {
        // Only the base name is matched against the junk file list
        assert!(!is_junk("Thumbs.db/001.jpg"));
    }
}
