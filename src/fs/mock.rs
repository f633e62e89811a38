// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum MockEntry {
    File,
    Dir,
}

/// In-memory filesystem: only knows which paths exist and what they are.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashSet<PathBuf>>>,
    dirs: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file; its ancestors become directories.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.insert(path, MockEntry::File);
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.insert(ancestor, MockEntry::Dir);
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let set = match entry {
            MockEntry::File => &self.files,
            MockEntry::Dir => &self.dirs,
        };
        if let Ok(mut set) = set.lock() {
            set.insert(path.to_path_buf());
        }
    }

    fn contains(&self, path: &Path, entry: MockEntry) -> bool {
        let set = match entry {
            MockEntry::File => &self.files,
            MockEntry::Dir => &self.dirs,
        };
        set.lock().map(|set| set.contains(path)).unwrap_or(false)
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.contains(path, MockEntry::File) || self.contains(path, MockEntry::Dir)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.contains(path, MockEntry::Dir)
    }
}
