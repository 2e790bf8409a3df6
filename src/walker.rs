// src/walker.rs

//! Source discovery
//!
//! Builds the ordered work list for a run. A single-file source is the whole
//! batch; a directory is walked recursively and every regular file is
//! classified. Symlinks to files count as files; symlinked directories are
//! not descended into. Unsupported files are reported once here and never
//! reach the Driver's item loop.

use crate::classify::{Classifier, Decision, SkipReason};
use crate::diagnostics::Diagnostics;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file scheduled for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// Absolute path of the source file
    pub path: PathBuf,
    /// Path relative to the run's relative base
    pub relative: PathBuf,
    pub decision: Decision,
}

impl SourceItem {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of walking a source
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Work list, sorted by full path
    pub items: Vec<SourceItem>,
    /// Every regular file seen, accepted or not
    pub total_files: usize,
    /// Files with an unrecognized extension
    pub unsupported: usize,
    /// Recognized files removed by `--rar-only` or the exclusion hook
    pub filtered: usize,
}

/// Enumerate the work list for `source`
///
/// `rel_base` must be `source` itself or one of its ancestors.
pub fn discover(
    source: &Path,
    rel_base: &Path,
    classifier: &Classifier,
    diag: &dyn Diagnostics,
) -> Discovery {
    let mut discovery = Discovery::default();

    if source.is_file() {
        discovery.total_files = 1;
        discovery.items.push(make_item(source, rel_base, classifier));
        return discovery;
    }

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                diag.warn(&format!("Unable to read {}", e));
                continue;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        discovery.total_files += 1;

        let item = make_item(entry.path(), rel_base, classifier);
        match item.decision {
            Decision::Skip(SkipReason::Unsupported) => {
                diag.info(&format!(
                    "{} is not a supported filetype.",
                    item.path.display()
                ));
                discovery.unsupported += 1;
            }
            Decision::Skip(reason) => {
                diag.debug(&format!("{} skipped ({:?})", item.path.display(), reason));
                discovery.filtered += 1;
            }
            _ => discovery.items.push(item),
        }
    }

    discovery
        .items
        .sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
    discovery
}

fn make_item(path: &Path, rel_base: &Path, classifier: &Classifier) -> SourceItem {
    let relative = path
        .strip_prefix(rel_base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or(path.as_os_str())));

    SourceItem {
        path: path.to_path_buf(),
        relative,
        decision: classifier.classify_path(path),
    }
}
