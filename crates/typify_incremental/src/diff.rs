//! The change set describing one rebuild's input delta.

use camino::{Utf8Path, Utf8PathBuf};

/// Paths added, changed and removed since the previous rebuild, relative to
/// the input tree.
///
/// The caller guarantees the three lists are disjoint. Added and changed
/// paths are treated the same by the registry; only paths it has never seen
/// extend the root file set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Paths that appeared.
    pub added: Vec<Utf8PathBuf>,
    /// Paths whose content changed.
    pub changed: Vec<Utf8PathBuf>,
    /// Paths that disappeared.
    pub removed: Vec<Utf8PathBuf>,
}

impl Diff {
    /// Creates an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an added path.
    pub fn with_added(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.added.push(path.into());
        self
    }

    /// Adds a changed path.
    pub fn with_changed(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.changed.push(path.into());
        self
    }

    /// Adds a removed path.
    pub fn with_removed(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.removed.push(path.into());
        self
    }

    /// Returns `true` if nothing was added, changed or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Added and changed paths, in that order.
    pub fn touched(&self) -> impl Iterator<Item = &Utf8Path> {
        self.added
            .iter()
            .chain(self.changed.iter())
            .map(|p| p.as_path())
    }
}

/// Returns `true` if `path` ends with one of the recognized extensions.
pub fn is_recognized(path: &Utf8Path, extensions: &[String]) -> bool {
    let name = path.as_str();
    extensions
        .iter()
        .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_diff() {
        assert!(Diff::new().is_empty());
        assert_eq!(Diff::new().touched().count(), 0);
    }

    #[test]
    fn touched_lists_added_then_changed() {
        let diff = Diff::new()
            .with_changed("b.ts")
            .with_added("a.ts")
            .with_removed("c.ts");
        let touched: Vec<_> = diff.touched().collect();
        assert_eq!(touched, vec![Utf8Path::new("a.ts"), Utf8Path::new("b.ts")]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn recognized_extensions() {
        let exts = vec![".ts".to_string(), ".js".to_string()];
        assert!(is_recognized(Utf8Path::new("src/a.ts"), &exts));
        assert!(is_recognized(Utf8Path::new("types.d.ts"), &exts));
        assert!(is_recognized(Utf8Path::new("orange.js"), &exts));
        assert!(!is_recognized(Utf8Path::new("style.css"), &exts));
        assert!(!is_recognized(Utf8Path::new(".ts"), &exts));
    }
}
