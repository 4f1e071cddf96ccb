//! Content-hash snapshots of the input tree.
//!
//! Two snapshots of the same tree, taken before and after an edit, yield the
//! [`Diff`] a coordinator rebuilds from.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_128;

use crate::diff::{is_recognized, Diff};

/// XXH3-128 digests of every recognized file in a tree, keyed by path
/// relative to the tree root. Equal digests are taken as equal content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    files: BTreeMap<Utf8PathBuf, u128>,
}

impl TreeSnapshot {
    /// An empty snapshot; diffing a scan against it reports every file as
    /// added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walks `root` and hashes every file ending in one of `extensions`.
    ///
    /// Paths that are not valid UTF-8 and files that cannot be read are
    /// skipped. A missing root is an error.
    pub fn scan(root: &Utf8Path, extensions: &[String]) -> io::Result<Self> {
        let mut files = BTreeMap::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!(path = ?entry.path(), "skipping non UTF-8 path");
                continue;
            };
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if !is_recognized(relative, extensions) {
                continue;
            }
            match std::fs::read(path) {
                Ok(content) => {
                    files.insert(relative.to_path_buf(), xxh3_128(&content));
                }
                Err(err) => warn!(%path, error = %err, "skipping unreadable file"),
            }
        }
        debug!(%root, files = files.len(), "scanned input tree");
        Ok(Self { files })
    }

    /// Classifies every path of `previous` and `current` as added, changed or
    /// removed. Each list is sorted.
    pub fn diff(previous: &TreeSnapshot, current: &TreeSnapshot) -> Diff {
        let mut diff = Diff::new();
        for (path, hash) in &current.files {
            match previous.files.get(path) {
                None => diff.added.push(path.clone()),
                Some(old) if old != hash => diff.changed.push(path.clone()),
                Some(_) => {}
            }
        }
        for path in previous.files.keys() {
            if !current.files.contains_key(path) {
                diff.removed.push(path.clone());
            }
        }
        diff
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the snapshot has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns `true` if `path` is in the snapshot.
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(path)
    }
}
