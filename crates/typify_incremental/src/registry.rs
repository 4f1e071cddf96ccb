//! The file registry: known input files, their revisions, and the root set.

use std::collections::HashMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

/// The staleness token the engine uses to decide whether its cached parse of
/// a file is still valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptVersion {
    /// A file tracked by the registry, at the given revision.
    Revision(u64),
    /// A file outside the registry (library or dependency typings), versioned
    /// by the engine itself.
    Unversioned,
}

impl fmt::Display for ScriptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptVersion::Revision(revision) => write!(f, "{revision}"),
            ScriptVersion::Unversioned => Ok(()),
        }
    }
}

/// Tracks every input file seen in a diff, keyed by its path relative to the
/// input tree, together with the ordered, duplicate-free root file set.
#[derive(Debug, Default)]
pub struct FileRegistry {
    revisions: HashMap<Utf8PathBuf, u64>,
    root_files: Vec<Utf8PathBuf>,
}

impl FileRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose root file set starts with `root_files`.
    ///
    /// Seeded roots stay unversioned until their first touch.
    pub fn with_root_files(root_files: impl IntoIterator<Item = Utf8PathBuf>) -> Self {
        let mut registry = Self::new();
        for path in root_files {
            if !registry.root_files.contains(&path) {
                registry.root_files.push(path);
            }
        }
        registry
    }

    /// Records one change event for `path` and returns its new revision.
    ///
    /// An unknown path starts at revision 0 and joins the root file set; a
    /// known path has its revision incremented.
    pub fn touch(&mut self, path: &Utf8Path) -> u64 {
        if let Some(revision) = self.revisions.get_mut(path) {
            *revision += 1;
            return *revision;
        }
        self.revisions.insert(path.to_path_buf(), 0);
        if !self.root_files.iter().any(|p| p == path) {
            self.root_files.push(path.to_path_buf());
        }
        0
    }

    /// Forgets `path`. Removing an untracked path is a no-op.
    pub fn remove(&mut self, path: &Utf8Path) {
        self.revisions.remove(path);
        self.root_files.retain(|p| p != path);
    }

    /// Returns the version token of `path`.
    pub fn revision_of(&self, path: &Utf8Path) -> ScriptVersion {
        self.revisions
            .get(path)
            .map_or(ScriptVersion::Unversioned, |r| ScriptVersion::Revision(*r))
    }

    /// Returns `true` if `path` is tracked.
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.revisions.contains_key(path)
    }

    /// Returns the number of tracked files.
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Returns `true` if no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// The root file set, in insertion order.
    pub fn root_files(&self) -> &[Utf8PathBuf] {
        &self.root_files
    }
}
