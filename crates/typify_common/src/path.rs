//! Relative input path handling.
//!
//! Input paths are keyed relative to the input tree root with `/` separators.
//! Anything absolute or escaping the root is a host bug and is rejected.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::result::{InternalError, TypifyResult};

/// Normalizes a path that must be relative to the input tree.
///
/// Drops `.` components and rejects absolute paths and `..` components.
pub fn normalize_relative(path: &Utf8Path) -> TypifyResult<Utf8PathBuf> {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Normal(part) => out.push(part),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                return Err(InternalError::new(format!(
                    "input path '{path}' escapes the input tree"
                )))
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(InternalError::new(format!(
                    "input path '{path}' must be relative to the input tree"
                )))
            }
        }
    }
    if out.as_str().is_empty() {
        return Err(InternalError::new("empty input path"));
    }
    Ok(out)
}

/// Returns `path` relative to `root` when it lies inside the root.
pub fn strip_root<'a>(root: &Utf8Path, path: &'a Utf8Path) -> Option<&'a Utf8Path> {
    path.strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_str().is_empty())
}
