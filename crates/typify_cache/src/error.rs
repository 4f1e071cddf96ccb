//! Error types for cache operations.

use camino::Utf8PathBuf;

/// Errors that can occur while writing to or pruning the output cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while writing or deleting a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact path given to the writer lies outside the cache root.
    #[error("artifact {path} is outside the cache root {root}")]
    OutsideCache {
        /// The offending artifact path.
        path: Utf8PathBuf,
        /// The cache root.
        root: Utf8PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: Utf8PathBuf::from("/tmp/out/a.js"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("a.js"));
    }

    #[test]
    fn outside_cache_display() {
        let err = CacheError::OutsideCache {
            path: Utf8PathBuf::from("/etc/passwd"),
            root: Utf8PathBuf::from("/tmp/out"),
        };
        assert_eq!(
            err.to_string(),
            "artifact /etc/passwd is outside the cache root /tmp/out"
        );
    }
}
