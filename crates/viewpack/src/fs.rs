//! File access used by path resolution and loading
//!
//! The resolver and loader only see this trait, so the import walk can run
//! over the real filesystem or over an in-memory tree.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use crate::types::{FxIndexMap, FxIndexSet};

/// Read-only view of a filesystem.
pub trait FileSystem: fmt::Debug {
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8. The handle is released before returning.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// An in-memory tree of files keyed by absolute path.
///
/// Directories exist implicitly as ancestors of inserted files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: FxIndexMap<PathBuf, String>,
    dirs: FxIndexSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, registering all of its ancestors as directories.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        for ancestor in path.ancestors().skip(1) {
            if !self.dirs.insert(ancestor.to_path_buf()) {
                break;
            }
        }
        self.files.insert(path, contents.into());
    }

    /// Builder-style [`MemoryFileSystem::insert`].
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fs_registers_ancestor_dirs() {
        let fs = MemoryFileSystem::new().with_file("/app/views/nav/item.html", "<item:>");

        assert!(fs.is_file(Path::new("/app/views/nav/item.html")));
        assert!(fs.is_dir(Path::new("/app/views/nav")));
        assert!(fs.is_dir(Path::new("/app")));
        assert!(!fs.is_dir(Path::new("/app/views/nav/item.html")));
        assert!(!fs.is_file(Path::new("/app/views")));
    }

    #[test]
    fn test_memory_fs_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs
            .read_to_string(Path::new("/nope.html"))
            .expect_err("missing file should not be readable");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
