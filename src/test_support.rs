//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::fs::entry::{Entry, EntryType};
use crate::fs::listing::{DirContents, Listing, Preview};

/// Build the reference tree used throughout the tests:
///
/// ```text
/// <tmp>/
/// ├── dir/{file1, file2}
/// ├── empty-dir/
/// ├── empty-file.txt
/// ├── file.jpg          (7 bytes, contains NUL)
/// └── text-file.txt     ("text file content")
/// ```
pub fn mock_dir1() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("empty-file.txt"), "").unwrap();
    fs::write(dir.path().join("text-file.txt"), "text file content").unwrap();
    fs::write(dir.path().join("file.jpg"), [8u8, 6, 7, 5, 3, 0, 9]).unwrap();
    fs::create_dir(dir.path().join("empty-dir")).unwrap();
    fs::create_dir(dir.path().join("dir")).unwrap();
    fs::write(dir.path().join("dir").join("file1"), "text file 1").unwrap();
    fs::write(dir.path().join("dir").join("file2"), "").unwrap();
    dir
}

/// Entry names of a listing, in listing order.
pub fn names(listing: &Listing) -> Vec<String> {
    listing.entries().iter().map(|e| e.name.clone()).collect()
}

/// In-memory directory listing; names ending in `/` become directories.
pub fn dir_listing(names: &[&str]) -> Listing {
    let entries = names
        .iter()
        .map(|n| match n.strip_suffix('/') {
            Some(dir) => Entry::new(dir, EntryType::Directory, None),
            None => Entry::new(n, EntryType::File, Some(1)),
        })
        .collect();
    Listing::Directory(DirContents::Entries(entries))
}

pub fn text_listing(text: &str) -> Listing {
    Listing::File {
        preview: Preview::Text(text.to_string()),
        size: text.len() as u64,
    }
}

/// Strip all permissions from `path` and report whether that actually
/// blocks access. Returns `false` (with permissions restored) when running
/// with privileges that ignore mode bits.
#[cfg(unix)]
pub fn permissions_enforced(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    let blocked = if path.is_dir() {
        fs::read_dir(path).is_err()
    } else {
        fs::File::open(path).is_err()
    };
    if !blocked {
        restore_permissions(path);
    }
    blocked
}

#[cfg(not(unix))]
pub fn permissions_enforced(_path: &Path) -> bool {
    false
}

#[cfg(unix)]
pub fn restore_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let mode = if path.is_dir() { 0o755 } else { 0o644 };
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
pub fn restore_permissions(_path: &Path) {}
