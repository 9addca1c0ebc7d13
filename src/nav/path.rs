//! Path resolution for the three panes.
//!
//! Every path is canonicalized, so entering a symlinked directory lands on
//! its target and going back leads to the target's real parent. Paths that
//! no longer resolve fall back to lexical normalization.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::fs::listing::Listing;

/// Canonical form of `path`; falls back to lexical normalization when the
/// path cannot be resolved on disk.
pub fn current_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

/// Canonical directory containing `path`, or `None` at the filesystem root.
pub fn parent_path(path: &Path) -> Option<PathBuf> {
    path.parent().map(current_path)
}

/// Canonical path of the entry at `selected` inside `path`. `None` when the
/// listing has no real entries or `selected` is out of range.
pub fn child_path(path: &Path, listing: &Listing, selected: usize) -> Option<PathBuf> {
    listing
        .entries()
        .get(selected)
        .map(|e| current_path(&path.join(&e.file_name)))
}

/// Last component of `path`, as stored on disk.
pub fn basename(path: &Path) -> Option<&OsStr> {
    path.file_name()
}

/// Remove `.` components, fold `..` into their parent and drop trailing
/// separators without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
