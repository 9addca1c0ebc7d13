use std::ffi::OsString;
use std::path::Path;

use log::debug;
use tokio::fs;

/// Type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
    Symlink,
}

/// A classified child of a directory. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name as stored on disk. Paths are built from this.
    pub file_name: OsString,
    /// Lossy UTF-8 rendering of `file_name` for display and search.
    pub name: String,
    pub entry_type: EntryType,
    /// Byte length for files, target length for symlinks, `None` for directories.
    pub size: Option<u64>,
}

impl Entry {
    pub fn new(file_name: impl Into<OsString>, entry_type: EntryType, size: Option<u64>) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            entry_type,
            size,
        }
    }

    /// Classify the entry at `path`, naming it after the last path component.
    pub async fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_os_string();
        let (entry_type, size) = classify(path).await;
        Self::new(file_name, entry_type, size)
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

/// Query the filesystem for the type and size of `path`.
///
/// Never fails: an entry whose status cannot be read (deleted mid-listing,
/// dangling symlink) degrades to a zero-size file so the surrounding
/// listing still loads.
pub async fn classify(path: &Path) -> (EntryType, Option<u64>) {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) => {
            debug!("stat failed for {}: {}", path.display(), e);
            return (EntryType::File, Some(0));
        }
    };

    if metadata.file_type().is_symlink() {
        return match fs::metadata(path).await {
            Ok(target) => (EntryType::Symlink, Some(target.len())),
            Err(e) => {
                debug!("dangling symlink {}: {}", path.display(), e);
                (EntryType::File, Some(0))
            }
        };
    }

    if metadata.is_dir() {
        (EntryType::Directory, None)
    } else {
        (EntryType::File, Some(metadata.len()))
    }
}
