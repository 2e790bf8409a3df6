// src/repack/builder.rs

//! Deterministic ZIP construction from a staged directory
//!
//! Entries are collected from the extraction staging area, stripped of
//! platform junk, sorted by their archive-internal path, and written in STORE
//! mode with a fixed timestamp and fixed permissions. Two builds from the
//! same staged content produce byte-identical archives.

use crate::error::{Error, Result};
use crate::junk::is_junk;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Sidecar metadata file conventionally carried by comic archives
pub const COMIC_INFO: &str = "ComicInfo.xml";

/// Permission bits recorded for every member
const MEMBER_MODE: u32 = 0o644;

/// One file destined for the rebuilt archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-internal path, forward-slash separated
    pub relative: String,
    /// Location of the staged file on disk
    pub path: PathBuf,
}

/// Filtered, ordered contents of a staging directory
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    pub entries: Vec<ArchiveEntry>,
    /// Junk entries that were dropped
    pub dropped: Vec<String>,
}

impl EntrySet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any kept entry is a `ComicInfo.xml` sidecar
    pub fn has_comic_info(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.relative.rsplit('/').next() == Some(COMIC_INFO))
    }
}

/// Collect every regular file under `root` as an archive entry
///
/// Directories and symlinks are not entries. Junk is dropped, and the
/// remainder is sorted by the byte order of the internal path.
pub fn collect_entries(root: &Path) -> Result<EntrySet> {
    let mut set = EntrySet::default();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io(path, io::Error::other(e.to_string()))
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if is_junk(&relative) {
            set.dropped.push(relative);
            continue;
        }

        set.entries.push(ArchiveEntry {
            relative,
            path: entry.path().to_path_buf(),
        });
    }

    set.entries.sort_by(|a, b| a.relative.as_bytes().cmp(b.relative.as_bytes()));
    set.dropped.sort();
    Ok(set)
}

/// Write `entries` in order as a STORE-mode ZIP at `output`
///
/// No directory entries are written; member paths carry the hierarchy.
pub fn write_archive(entries: &[ArchiveEntry], output: &Path) -> Result<()> {
    let file = File::create(output).map_err(|e| Error::io(output, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
        .unix_permissions(MEMBER_MODE);

    for entry in entries {
        zip.start_file(entry.relative.as_str(), options)?;
        let mut input = File::open(&entry.path).map_err(|e| Error::io(&entry.path, e))?;
        io::copy(&mut input, &mut zip).map_err(|e| Error::io(output, e))?;
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(|e| Error::io(output, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| Error::io(output, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn stage(files: &[(&str, &[u8])]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, data) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, data).unwrap();
        }
        dir
    }

    fn member_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_collect_sorts_and_drops_junk() {
        let staged = stage(&[
            ("b.jpg", b"b"),
            ("a.jpg", b"a"),
            ("Thumbs.db", b"junk"),
            ("__MACOSX/._a.jpg", b"fork"),
            ("sub/c.jpg", b"c"),
            ("sub/.DS_Store", b"junk"),
        ]);

        let set = collect_entries(staged.path()).unwrap();
        let names: Vec<_> = set.entries.iter().map(|e| e.relative.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "sub/c.jpg"]);
        assert_eq!(set.dropped.len(), 3);
    }

    #[test]
    fn test_byte_order_puts_uppercase_first() {
        let staged = stage(&[("a.jpg", b"a"), ("B.jpg", b"b"), ("_c.jpg", b"c")]);
        let set = collect_entries(staged.path()).unwrap();
        let names: Vec<_> = set.entries.iter().map(|e| e.relative.as_str()).collect();
        assert_eq!(names, vec!["B.jpg", "_c.jpg", "a.jpg"]);
    }

    #[test]
    fn test_comic_info_detection() {
        let with = stage(&[("001.jpg", b"x"), ("ComicInfo.xml", b"<x/>")]);
        assert!(collect_entries(with.path()).unwrap().has_comic_info());

        let nested = stage(&[("inner/ComicInfo.xml", b"<x/>")]);
        assert!(collect_entries(nested.path()).unwrap().has_comic_info());

        let without = stage(&[("001.jpg", b"x"), ("comicinfo.xml", b"<x/>")]);
        assert!(!collect_entries(without.path()).unwrap().has_comic_info());
    }

    #[test]
    fn test_write_archive_is_stored_and_ordered() {
        let staged = stage(&[("p/002.jpg", b"two"), ("p/001.jpg", b"one")]);
        let set = collect_entries(staged.path()).unwrap();

        let out_dir = TempDir::new().unwrap();
        let output = out_dir.path().join("book.cbz");
        write_archive(&set.entries, &output).unwrap();

        assert_eq!(member_names(&output), vec!["p/001.jpg", "p/002.jpg"]);

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let member = archive.by_name("p/001.jpg").unwrap();
        assert_eq!(member.compression(), CompressionMethod::Stored);
        assert!(!member.is_dir());
    }

    #[test]
    fn test_write_archive_is_reproducible() {
        let staged = stage(&[("a.jpg", b"aaaa"), ("ComicInfo.xml", b"<ComicInfo/>")]);
        let set = collect_entries(staged.path()).unwrap();

        let out_dir = TempDir::new().unwrap();
        let first = out_dir.path().join("first.cbz");
        let second = out_dir.path().join("second.cbz");
        write_archive(&set.entries, &first).unwrap();

        // Touch the staged files; timestamps must not leak into the archive
        filetime::set_file_mtime(
            staged.path().join("a.jpg"),
            filetime::FileTime::from_unix_time(1_700_000_000, 0),
        )
        .unwrap();
        write_archive(&set.entries, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_empty_entry_set_writes_valid_archive() {
        let out_dir = TempDir::new().unwrap();
        let output = out_dir.path().join("empty.cbz");
        write_archive(&[], &output).unwrap();
        assert!(member_names(&output).is_empty());
    }
}
