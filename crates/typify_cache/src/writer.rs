//! Writing and pruning artifacts in the output cache.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, trace};

use crate::artifact::ArtifactPaths;
use crate::error::CacheError;

/// Persists emitted artifacts under the cache root and removes the artifact
/// set of deleted inputs.
///
/// Writes are synchronous and unguarded: a crash mid-write leaves a truncated
/// artifact that the next full build overwrites.
#[derive(Debug, Clone)]
pub struct OutputCacheWriter {
    cache_root: Utf8PathBuf,
    extensions: Vec<String>,
}

impl OutputCacheWriter {
    /// Creates a writer for `cache_root`, deriving artifact names with the
    /// given recognized input extensions.
    pub fn new(cache_root: impl Into<Utf8PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            cache_root: cache_root.into(),
            extensions,
        }
    }

    /// Returns the cache root.
    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    /// Writes `content` to the absolute `path`, creating missing parent
    /// directories and overwriting any existing file.
    pub fn write(&self, path: &Utf8Path, content: &str) -> Result<(), CacheError> {
        if !path.starts_with(&self.cache_root) {
            return Err(CacheError::OutsideCache {
                path: path.to_path_buf(),
                root: self.cache_root.clone(),
            });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        trace!(%path, bytes = content.len(), "writing artifact");
        std::fs::write(path, content).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Removes the artifact set of the input file at `input` (relative to the
    /// input tree). Returns the number of files deleted.
    ///
    /// The code and map outputs are only touched when the code output exists.
    /// The declaration output is always attempted; a missing one is not an
    /// error.
    pub fn remove_artifacts_for(&self, input: &Utf8Path) -> Result<usize, CacheError> {
        let Some(paths) = ArtifactPaths::for_input(input, &self.extensions) else {
            debug!(%input, "no artifact set to remove");
            return Ok(0);
        };

        let mut removed = 0;
        let code = self.cache_root.join(&paths.code);
        if code.is_file() {
            removed += remove_if_present(&code)?;
            removed += remove_if_present(&self.cache_root.join(&paths.map))?;
        }
        removed += remove_if_present(&self.cache_root.join(&paths.declaration))?;

        debug!(%input, removed, "removed artifacts");
        Ok(removed)
    }
}

fn remove_if_present(path: &Utf8Path) -> Result<usize, CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(1),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(source) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_writer() -> (tempfile::TempDir, OutputCacheWriter) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let writer = OutputCacheWriter::new(root, vec![".ts".to_string(), ".js".to_string()]);
        (dir, writer)
    }

    #[test]
    fn write_creates_parent_directories() {
        let (_dir, writer) = make_writer();
        let path = writer.cache_root().join("deeply/nested/a.js");
        writer.write(&path, "var a;").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "var a;");
    }

    #[test]
    fn write_overwrites() {
        let (_dir, writer) = make_writer();
        let path = writer.cache_root().join("a.js");
        writer.write(&path, "old").unwrap();
        writer.write(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn write_outside_cache_rejected() {
        let (_dir, writer) = make_writer();
        let err = writer
            .write(Utf8Path::new("/definitely/not/the/cache/a.js"), "x")
            .unwrap_err();
        assert!(matches!(err, CacheError::OutsideCache { .. }));
    }

    #[test]
    fn remove_full_artifact_set() {
        let (_dir, writer) = make_writer();
        let root = writer.cache_root().to_path_buf();
        for name in ["src/a.js", "src/a.js.map", "src/a.d.ts"] {
            writer.write(&root.join(name), "x").unwrap();
        }

        let removed = writer.remove_artifacts_for(Utf8Path::new("src/a.ts")).unwrap();
        assert_eq!(removed, 3);
        assert!(!root.join("src/a.js").exists());
        assert!(!root.join("src/a.js.map").exists());
        assert!(!root.join("src/a.d.ts").exists());
    }

    #[test]
    fn remove_without_map_or_declaration() {
        let (_dir, writer) = make_writer();
        let root = writer.cache_root().to_path_buf();
        writer.write(&root.join("a.js"), "x").unwrap();

        let removed = writer.remove_artifacts_for(Utf8Path::new("a.ts")).unwrap();
        assert_eq!(removed, 1);
        assert!(!root.join("a.js").exists());
    }

    #[test]
    fn remove_never_emitted_is_noop() {
        let (_dir, writer) = make_writer();
        let removed = writer.remove_artifacts_for(Utf8Path::new("ghost.ts")).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn map_left_alone_when_code_missing() {
        let (_dir, writer) = make_writer();
        let root = writer.cache_root().to_path_buf();
        writer.write(&root.join("b.js.map"), "{}").unwrap();
        writer.write(&root.join("b.d.ts"), "declare const b: number;").unwrap();

        let removed = writer.remove_artifacts_for(Utf8Path::new("b.ts")).unwrap();
        assert_eq!(removed, 1);
        assert!(root.join("b.js.map").exists());
        assert!(!root.join("b.d.ts").exists());
    }

    #[test]
    fn remove_script_input() {
        let (_dir, writer) = make_writer();
        let root = writer.cache_root().to_path_buf();
        writer.write(&root.join("orange.js"), "var orange;").unwrap();

        let removed = writer.remove_artifacts_for(Utf8Path::new("orange.js")).unwrap();
        assert_eq!(removed, 1);
        assert!(!root.join("orange.js").exists());
    }

    #[test]
    fn remove_declaration_input_is_noop() {
        let (_dir, writer) = make_writer();
        let root = writer.cache_root().to_path_buf();
        writer.write(&root.join("types.d.ts"), "x").unwrap();
        let removed = writer.remove_artifacts_for(Utf8Path::new("types.d.ts")).unwrap();
        assert_eq!(removed, 0);
        assert!(root.join("types.d.ts").exists());
    }
}
