use std::ffi::OsStr;
use std::io::{self, ErrorKind};
use std::path::Path;

use log::debug;
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::error::{AppError, Result};
use crate::fs::entry::Entry;

/// Default cap on how much of a text file is read for its preview (1 MiB).
pub const DEFAULT_MAX_PREVIEW_BYTES: u64 = 1_048_576;
/// Default number of leading bytes inspected by the binary heuristic.
pub const DEFAULT_SNIFF_BYTES: usize = 8192;

/// Leading byte sequences of common binary formats.
const BINARY_SIGNATURES: &[&[u8]] = &[
    b"\x89PNG\r\n\x1a\n",
    b"\xff\xd8\xff",
    b"GIF87a",
    b"GIF89a",
    b"%PDF-",
    b"PK\x03\x04",
    b"\x7fELF",
    b"\x1f\x8b",
    b"7z\xbc\xaf\x27\x1c",
    b"\0asm",
    b"\xca\xfe\xba\xbe",
    b"\xcf\xfa\xed\xfe",
    b"MZ\x90\0",
];

/// Contents of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirContents {
    /// Directories first, then everything else, each group sorted by name.
    Entries(Vec<Entry>),
    Empty,
    NotAccessible,
}

/// Previewable content of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Text(String),
    Empty,
    NotAccessible,
    Binary,
}

/// The loaded representation of a path: either a directory's entries or a
/// file's preview. Produced fresh on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Directory(DirContents),
    File { preview: Preview, size: u64 },
}

impl Listing {
    /// Real entries of a directory listing; empty for files and placeholders.
    pub fn entries(&self) -> &[Entry] {
        match self {
            Listing::Directory(DirContents::Entries(entries)) => entries,
            _ => &[],
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Listing::Directory(_))
    }

    /// Entry count for directories, byte length for files.
    pub fn size(&self) -> u64 {
        match self {
            Listing::Directory(_) => self.entries().len() as u64,
            Listing::File { size, .. } => *size,
        }
    }

    /// Index of the entry whose on-disk name is `file_name`, if this is a
    /// directory containing it.
    pub fn position_of(&self, file_name: &OsStr) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| e.file_name.as_os_str() == file_name)
    }

    /// Display text for sentinel contents, `None` for real entries or text.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Listing::Directory(DirContents::Empty) | Listing::File { preview: Preview::Empty, .. } => {
                Some("(Empty)")
            }
            Listing::Directory(DirContents::NotAccessible)
            | Listing::File {
                preview: Preview::NotAccessible,
                ..
            } => Some("(Not Accessible)"),
            Listing::File {
                preview: Preview::Binary,
                ..
            } => Some("(Binary)"),
            _ => None,
        }
    }
}

/// Produces listings for paths. Cheap to clone; each load is independent.
#[derive(Debug, Clone)]
pub struct ListingLoader {
    max_preview_bytes: u64,
    sniff_bytes: usize,
}

impl Default for ListingLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PREVIEW_BYTES, DEFAULT_SNIFF_BYTES)
    }
}

impl ListingLoader {
    pub fn new(max_preview_bytes: u64, sniff_bytes: usize) -> Self {
        Self {
            max_preview_bytes,
            sniff_bytes: sniff_bytes.max(1),
        }
    }

    /// Load the listing for `path`.
    ///
    /// Permission problems become `NotAccessible` contents; anything else
    /// (the path vanished, an unknown I/O failure) is returned as
    /// [`AppError::Load`].
    pub async fn load(&self, path: &Path) -> Result<Listing> {
        let metadata = match fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Ok(Listing::File {
                    preview: Preview::NotAccessible,
                    size: 0,
                });
            }
            Err(e) => return Err(AppError::load(path, e)),
        };

        if metadata.is_dir() {
            self.load_directory(path).await
        } else {
            self.load_file(path, metadata.len()).await
        }
    }

    async fn load_directory(&self, path: &Path) -> Result<Listing> {
        let mut read_dir = match fs::read_dir(path).await {
            Ok(rd) => rd,
            Err(e) => return enumeration_failed(path, e),
        };

        let mut entries = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(dir_entry)) => entries.push(Entry::from_path(&dir_entry.path()).await),
                Ok(None) => break,
                // A partial listing is never returned.
                Err(e) => return enumeration_failed(path, e),
            }
        }

        if entries.is_empty() {
            return Ok(Listing::Directory(DirContents::Empty));
        }
        sort_entries(&mut entries);
        Ok(Listing::Directory(DirContents::Entries(entries)))
    }

    async fn load_file(&self, path: &Path, size: u64) -> Result<Listing> {
        if size == 0 {
            return Ok(Listing::File {
                preview: Preview::Empty,
                size: 0,
            });
        }

        let mut file = match fs::File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Ok(Listing::File {
                    preview: Preview::NotAccessible,
                    size: 0,
                });
            }
            Err(e) => return Err(AppError::load(path, e)),
        };

        let mut buf = Vec::with_capacity(self.sniff_bytes);
        (&mut file)
            .take(self.sniff_bytes as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| AppError::load(path, e))?;

        if looks_binary(&buf) {
            return Ok(Listing::File {
                preview: Preview::Binary,
                size,
            });
        }

        let remaining = self.max_preview_bytes.saturating_sub(buf.len() as u64);
        file.take(remaining)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| AppError::load(path, e))?;

        Ok(Listing::File {
            preview: Preview::Text(String::from_utf8_lossy(&buf).into_owned()),
            size,
        })
    }
}

/// Permission errors while listing `path` make it `NotAccessible`; any
/// other error fails the load.
fn enumeration_failed(path: &Path, e: io::Error) -> Result<Listing> {
    if e.kind() == ErrorKind::PermissionDenied {
        debug!("enumeration of {} denied: {}", path.display(), e);
        Ok(Listing::Directory(DirContents::NotAccessible))
    } else {
        Err(AppError::load(path, e))
    }
}

/// Directories first, then files and symlinks; names compared byte-wise.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}

/// Decide whether a file's leading bytes belong to a binary format.
///
/// Checks magic signatures, then NUL bytes, then the share of control
/// characters that never appear in text.
pub fn looks_binary(head: &[u8]) -> bool {
    if head.is_empty() {
        return false;
    }
    if BINARY_SIGNATURES.iter().any(|sig| head.starts_with(sig)) {
        return true;
    }
    if head.contains(&0) {
        return true;
    }
    let suspicious = head
        .iter()
        .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b)) || b == 0x7f)
        .count();
    suspicious * 10 > head.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::entry::EntryType;
    use crate::test_support::{mock_dir1, names, permissions_enforced};
    use std::fs as stdfs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_directory_contents_dirs_first() {
        let mock = mock_dir1();
        let listing = ListingLoader::default().load(mock.path()).await.unwrap();
        assert_eq!(
            names(&listing),
            vec!["dir", "empty-dir", "empty-file.txt", "file.jpg", "text-file.txt"]
        );
        let types: Vec<EntryType> = listing.entries().iter().map(|e| e.entry_type).collect();
        assert_eq!(
            types,
            vec![
                EntryType::Directory,
                EntryType::Directory,
                EntryType::File,
                EntryType::File,
                EntryType::File
            ]
        );
        assert_eq!(listing.size(), 5);
    }

    #[tokio::test]
    async fn sorting_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        stdfs::write(dir.path().join("beta"), "b").unwrap();
        stdfs::write(dir.path().join("Zeta"), "z").unwrap();
        stdfs::create_dir(dir.path().join("omega")).unwrap();
        stdfs::create_dir(dir.path().join("Alpha")).unwrap();
        let listing = ListingLoader::default().load(dir.path()).await.unwrap();
        assert_eq!(names(&listing), vec!["Alpha", "omega", "Zeta", "beta"]);
    }

    #[tokio::test]
    async fn read_empty_dir() {
        let mock = mock_dir1();
        let listing = ListingLoader::default()
            .load(&mock.path().join("empty-dir"))
            .await
            .unwrap();
        assert_eq!(listing, Listing::Directory(DirContents::Empty));
        assert_eq!(listing.placeholder(), Some("(Empty)"));
    }

    #[tokio::test]
    async fn read_denied_dir_is_not_accessible() {
        let dir = TempDir::new().unwrap();
        let denied = dir.path().join("denied");
        stdfs::create_dir(&denied).unwrap();
        stdfs::write(denied.join("secret"), "x").unwrap();
        if !permissions_enforced(&denied) {
            return;
        }
        let listing = ListingLoader::default().load(&denied).await;
        crate::test_support::restore_permissions(&denied);
        assert_eq!(
            listing.unwrap(),
            Listing::Directory(DirContents::NotAccessible)
        );
    }

    #[tokio::test]
    async fn read_text_file() {
        let mock = mock_dir1();
        let listing = ListingLoader::default()
            .load(&mock.path().join("text-file.txt"))
            .await
            .unwrap();
        assert_eq!(
            listing,
            Listing::File {
                preview: Preview::Text("text file content".into()),
                size: 17,
            }
        );
    }

    #[tokio::test]
    async fn read_empty_file() {
        let mock = mock_dir1();
        let listing = ListingLoader::default()
            .load(&mock.path().join("empty-file.txt"))
            .await
            .unwrap();
        assert_eq!(
            listing,
            Listing::File {
                preview: Preview::Empty,
                size: 0,
            }
        );
    }

    #[tokio::test]
    async fn read_binary_file() {
        let mock = mock_dir1();
        let listing = ListingLoader::default()
            .load(&mock.path().join("file.jpg"))
            .await
            .unwrap();
        assert_eq!(
            listing,
            Listing::File {
                preview: Preview::Binary,
                size: 7,
            }
        );
        assert_eq!(listing.placeholder(), Some("(Binary)"));
    }

    #[tokio::test]
    async fn read_denied_file_is_not_accessible() {
        let dir = TempDir::new().unwrap();
        let denied = dir.path().join("file-denied.txt");
        stdfs::write(&denied, "hidden").unwrap();
        if !permissions_enforced(&denied) {
            return;
        }
        let listing = ListingLoader::default().load(&denied).await;
        crate::test_support::restore_permissions(&denied);
        assert_eq!(
            listing.unwrap(),
            Listing::File {
                preview: Preview::NotAccessible,
                size: 0,
            }
        );
    }

    #[tokio::test]
    async fn read_non_existent_path_fails() {
        let mock = mock_dir1();
        let result = ListingLoader::default()
            .load(&mock.path().join("non-existent-file.txt"))
            .await;
        assert!(matches!(result, Err(AppError::Load { .. })));
    }

    #[tokio::test]
    async fn long_text_is_truncated_to_preview_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.txt");
        stdfs::write(&path, "a".repeat(100)).unwrap();
        let listing = ListingLoader::new(40, 16).load(&path).await.unwrap();
        match listing {
            Listing::File {
                preview: Preview::Text(text),
                size,
            } => {
                assert_eq!(text.len(), 40);
                assert_eq!(size, 100);
            }
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_directory_loads_as_directory() {
        let mock = mock_dir1();
        let link = mock.path().join("link-to-dir");
        std::os::unix::fs::symlink(mock.path().join("dir"), &link).unwrap();
        let listing = ListingLoader::default().load(&link).await.unwrap();
        assert_eq!(names(&listing), vec!["file1", "file2"]);
    }

    /// Linear congruential generator, enough to scramble test fixtures
    /// reproducibly.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mixed_directories_always_list_dirs_first_in_byte_order() {
        use std::os::unix::fs::symlink;

        const ALPHABET: &[u8] = b"aAbBzZ09._-~";
        for seed in 1..=8u64 {
            let mut rng = Lcg(seed);
            let dir = TempDir::new().unwrap();
            let target_dir = TempDir::new().unwrap();
            let target_file = target_dir.path().join("target");
            stdfs::write(&target_file, "target").unwrap();

            let count = 10 + (rng.next() % 20) as usize;
            let mut expected_dirs = Vec::new();
            for i in 0..count {
                let len = 1 + (rng.next() % 6) as usize;
                let mut name: String = (0..len)
                    .map(|_| ALPHABET[(rng.next() % ALPHABET.len() as u64) as usize] as char)
                    .collect();
                name.push_str(&i.to_string());
                let path = dir.path().join(&name);
                match rng.next() % 4 {
                    0 => {
                        stdfs::create_dir(&path).unwrap();
                        expected_dirs.push(name);
                    }
                    1 => stdfs::write(&path, &name).unwrap(),
                    2 => symlink(&target_file, &path).unwrap(),
                    _ => symlink(target_dir.path(), &path).unwrap(),
                }
            }

            let listing = ListingLoader::default().load(dir.path()).await.unwrap();
            let entries = listing.entries();
            assert_eq!(entries.len(), count, "seed {seed}");

            let split = entries.iter().take_while(|e| e.is_dir()).count();
            let (dirs, rest) = entries.split_at(split);
            assert!(rest.iter().all(|e| !e.is_dir()), "seed {seed}: {:?}", names(&listing));
            for group in [dirs, rest] {
                assert!(
                    group
                        .windows(2)
                        .all(|w| w[0].file_name.as_encoded_bytes() < w[1].file_name.as_encoded_bytes()),
                    "seed {seed}: {:?}",
                    names(&listing)
                );
            }

            let mut listed_dirs: Vec<String> = dirs.iter().map(|e| e.name.clone()).collect();
            listed_dirs.sort();
            expected_dirs.sort();
            assert_eq!(listed_dirs, expected_dirs, "seed {seed}");
        }
    }

    #[test]
    fn enumeration_errors_are_not_swallowed() {
        let path = Path::new("/mock/dir1");
        let denied = enumeration_failed(path, io::Error::from(ErrorKind::PermissionDenied));
        assert_eq!(
            denied.unwrap(),
            Listing::Directory(DirContents::NotAccessible)
        );

        let vanished = enumeration_failed(path, io::Error::from(ErrorKind::NotFound));
        assert!(matches!(vanished, Err(AppError::Load { .. })));
        let broken = enumeration_failed(path, io::Error::other("stale file handle"));
        assert!(matches!(broken, Err(AppError::Load { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_names_sort_by_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"b\xffname");
        if stdfs::write(dir.path().join(raw), "x").is_err() {
            return;
        }
        stdfs::write(dir.path().join("b"), "x").unwrap();
        stdfs::write(dir.path().join("c"), "x").unwrap();
        let listing = ListingLoader::default().load(dir.path()).await.unwrap();
        let raw_names: Vec<&OsStr> = listing
            .entries()
            .iter()
            .map(|e| e.file_name.as_os_str())
            .collect();
        assert_eq!(raw_names, vec![OsStr::new("b"), raw, OsStr::new("c")]);
        assert_eq!(listing.position_of(raw), Some(1));
    }

    #[test]
    fn signatures_are_binary() {
        assert!(looks_binary(b"\x89PNG\r\n\x1a\nrest"));
        assert!(looks_binary(b"%PDF-1.7 plain looking"));
        assert!(looks_binary(b"\x7fELF\x02\x01\x01"));
    }

    #[test]
    fn nul_byte_is_binary() {
        assert!(looks_binary(&[8, 6, 7, 5, 3, 0, 9]));
    }

    #[test]
    fn plain_and_utf8_text_is_not_binary() {
        assert!(!looks_binary(b"fn main() {\n\tprintln!(\"hi\");\n}\n"));
        assert!(!looks_binary("héllo wörld ✓".as_bytes()));
        assert!(!looks_binary(b"\x1b[31mred\x1b[0m\n"));
        assert!(!looks_binary(b""));
    }

    #[test]
    fn control_heavy_bytes_are_binary() {
        assert!(looks_binary(&[1, 2, 3, 4, b'a', b'b', 5, 6, 7, 8]));
    }

    #[test]
    fn position_of_finds_entry() {
        let listing = Listing::Directory(DirContents::Entries(vec![
            Entry::new("a", EntryType::Directory, None),
            Entry::new("b", EntryType::File, Some(1)),
        ]));
        assert_eq!(listing.position_of(OsStr::new("b")), Some(1));
        assert_eq!(listing.position_of(OsStr::new("c")), None);
        assert_eq!(listing.placeholder(), None);
    }
}
