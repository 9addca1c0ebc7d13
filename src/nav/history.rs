use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;

/// Default number of paths whose cursor position is remembered.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Remembered cursor position for a visited directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub selected: usize,
}

/// Bounded map from visited path to the selection to restore on re-entry.
///
/// When full, the path recorded least recently is evicted. Reads do not
/// refresh recency.
#[derive(Debug, Clone)]
pub struct History {
    entries: LruCache<PathBuf, HistoryEntry>,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Record the cursor position for `path`, refreshing its recency.
    pub fn record(&mut self, path: &Path, selected: usize) {
        self.entries
            .put(path.to_path_buf(), HistoryEntry { selected });
    }

    pub fn get(&self, path: &Path) -> Option<HistoryEntry> {
        self.entries.peek(path).copied()
    }

    /// Remembered selection for `path`, if any.
    pub fn selected(&self, path: &Path) -> Option<usize> {
        self.get(path).map(|e| e.selected)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
