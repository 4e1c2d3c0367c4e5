//! Filesystem store
//!
//! Writes mirrored resources under an output directory on the local disk.

use crate::storage::traits::{Store, StoreError, StoreResult};
use std::path::{Component, Path, PathBuf};

/// Store backed by the local filesystem
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at `root`
    ///
    /// Nothing is created on disk until the first write or `ensure_dir`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins a forward-slash relative path under the root
    ///
    /// Absolute paths and `..` components are rejected so a crafted URL can
    /// never write outside the output directory.
    fn resolve(&self, relative: &str) -> StoreResult<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StoreError::OutsideRoot(relative.to_string()));
                }
            }
        }
        Ok(path)
    }
}

impl Store for FsStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self, relative: &str) -> StoreResult<()> {
        let path = self.resolve(relative)?;
        std::fs::create_dir_all(&path).map_err(|source| StoreError::CreateDir { path, source })
    }

    fn write_file(&self, relative: &str, contents: &[u8]) -> StoreResult<()> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&path, contents).map_err(|source| StoreError::Write { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.write_file("a/b/c.css", b"body{}").unwrap();

        let written = std::fs::read(dir.path().join("a").join("b").join("c.css")).unwrap();
        assert_eq!(written, b"body{}");
    }

    #[test]
    fn test_ensure_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        let store = FsStore::new(&root);

        store.ensure_dir("").unwrap();

        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[test]
    fn test_reject_parent_components() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.write_file("../escape.html", b"x");
        assert!(matches!(result, Err(StoreError::OutsideRoot(_))));
    }

    #[test]
    fn test_reject_absolute_path() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.write_file("/etc/passwd", b"x");
        assert!(matches!(result, Err(StoreError::OutsideRoot(_))));
    }

    #[test]
    fn test_write_failure_reported() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        // A file where a directory is needed
        store.write_file("blocker", b"x").unwrap();
        let result = store.write_file("blocker/inner.png", b"y");

        assert!(matches!(result, Err(StoreError::CreateDir { .. })));
    }
}
