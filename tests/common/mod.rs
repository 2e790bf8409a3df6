// tests/common/mod.rs

//! Shared fixtures for integration tests.
//!
//! No RAR writer exists, so RAR-family fixtures are "manifest archives": a
//! real RAR5 signature followed by `path<TAB>content` lines. `ManifestExtractor`
//! understands that layout and stands in for the unrar backend.

#![allow(dead_code)]

use cbrxz::{ExtractionOutcome, RarExtractor, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const RAR5_MAGIC: &[u8] = b"Rar!\x1a\x07\x01\x00";

/// Line that makes the extractor report a damaged archive
pub const CORRUPT_MARKER: &str = "!corrupt";

/// Line prefix that makes the extractor skip an entry with a warning
pub const ENCRYPTED_MARKER: &str = "!encrypted ";

/// Extractor for manifest archives
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestExtractor;

impl RarExtractor for ManifestExtractor {
    fn extract_all(&self, archive: &Path, destination: &Path) -> Result<ExtractionOutcome> {
        let bytes = fs::read(archive).map_err(|e| cbrxz::Error::io(archive, e))?;
        let Some(body) = bytes.strip_prefix(RAR5_MAGIC) else {
            return Ok(ExtractionOutcome::NotThisFormat);
        };

        let mut warnings = Vec::new();
        for line in String::from_utf8_lossy(body).lines() {
            if line == CORRUPT_MARKER {
                return Ok(ExtractionOutcome::Corrupted("bad header crc".to_string()));
            }
            if let Some(name) = line.strip_prefix(ENCRYPTED_MARKER) {
                warnings.push(format!("{}: encrypted entry skipped", name));
                continue;
            }
            let Some((name, content)) = line.split_once('\t') else {
                continue;
            };
            let path = destination.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| cbrxz::Error::io(parent, e))?;
            }
            fs::write(&path, content).map_err(|e| cbrxz::Error::io(&path, e))?;
        }

        if warnings.is_empty() {
            Ok(ExtractionOutcome::Success)
        } else {
            Ok(ExtractionOutcome::PartialWarning(warnings))
        }
    }
}

/// Bytes of a manifest archive holding `entries`
pub fn manifest_rar(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = RAR5_MAGIC.to_vec();
    for (name, content) in entries {
        bytes.extend_from_slice(format!("{}\t{}\n", name, content).as_bytes());
    }
    bytes
}

/// Bytes of a manifest archive that reports itself as corrupted
pub fn corrupt_rar() -> Vec<u8> {
    let mut bytes = RAR5_MAGIC.to_vec();
    bytes.extend_from_slice(format!("001.jpg\tpage\n{}\n", CORRUPT_MARKER).as_bytes());
    bytes
}

/// Bytes of a real ZIP holding `entries`
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

/// Write `files` under `root`, creating parents
pub fn write_tree(root: &Path, files: &[(&str, Vec<u8>)]) {
    for (name, data) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }
}

/// Source and destination roots inside one temp dir
pub struct Workspace {
    pub temp_dir: TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(&source).unwrap();
        Self {
            temp_dir,
            source,
            dest,
        }
    }
}

/// Relative path -> file bytes for every file under `root`
pub fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    if !root.exists() {
        return files;
    }
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            files.insert(rel, fs::read(entry.path()).unwrap());
        }
    }
    files
}

/// Sorted relative paths of every file under `root`
pub fn list_files(root: &Path) -> Vec<String> {
    snapshot(root).into_keys().collect()
}

/// Member names of a ZIP, in archive order
pub fn zip_members(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Content of one ZIP member as a string
pub fn zip_member(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut member = archive.by_name(name).unwrap();
    let mut content = String::new();
    member.read_to_string(&mut content).unwrap();
    content
}
