//! File-based store for persistent storage.

use crate::error::{StoreError, StoreResult};
use crate::store::LogStore;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based store.
///
/// This store provides persistent storage using OS file APIs. Data survives
/// process restarts once `sync` has returned.
///
/// # Durability
///
/// - `write_at` hands bytes to the OS; they are not durable yet
/// - `sync` calls `File::sync_all()` to force data and metadata to disk
///
/// # Thread Safety
///
/// The store is thread-safe. Each call seeks and transfers under an internal
/// lock, so a positioned read may interleave with a positioned write without
/// either observing a torn transfer.
///
/// # Example
///
/// ```no_run
/// use redolog_storage::{LogStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("data.bin")).unwrap();
/// store.write_at(0, b"persistent data").unwrap();
/// store.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: RwLock<File>,
    len: RwLock<u64>,
}

impl FileStore {
    /// Opens or creates a file store at the given path.
    ///
    /// If the file exists it is opened in place; existing bytes are
    /// preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            len: RwLock::new(len),
        })
    }

    /// Opens or creates a file store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for FileStore {
    fn read_at(&self, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        let size = *self.len.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StoreError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> StoreResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let mut file = self.file.write();
        let mut len = self.len.write();

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;

        let end = offset + data.len() as u64;
        if end > *len {
            *len = end;
        }

        Ok(())
    }

    fn sync(&self) -> StoreResult<()> {
        let file = self.file.write();
        file.sync_all()?;
        Ok(())
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(*self.len.read())
    }

    fn truncate(&self, new_len: u64) -> StoreResult<()> {
        let file = self.file.write();
        let mut len = self.len.write();

        if new_len > *len {
            return Err(StoreError::TruncateBeyondEnd {
                new_len,
                size: *len,
            });
        }

        file.set_len(new_len)?;
        *len = new_len;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();

        store.write_at(0, b"hello").unwrap();
        store.write_at(5, b" world").unwrap();

        assert_eq!(store.len().unwrap(), 11);

        let data = store.read_at(0, 11).unwrap();
        assert_eq!(&data, b"hello world");
    }

    #[test]
    fn file_overwrite_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"hello world").unwrap();
        store.write_at(6, b"rust!").unwrap();

        assert_eq!(store.len().unwrap(), 11);
        assert_eq!(store.read_at(0, 11).unwrap(), b"hello rust!");
    }

    #[test]
    fn file_read_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"hello world").unwrap();

        let data = store.read_at(6, 5).unwrap();
        assert_eq!(&data, b"world");
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"hello").unwrap();

        let result = store.read_at(10, 5);
        assert!(matches!(result, Err(StoreError::ReadPastEnd { .. })));

        let result = store.read_at(3, 10);
        assert!(matches!(result, Err(StoreError::ReadPastEnd { .. })));
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        {
            let store = FileStore::open(&path).unwrap();
            store.write_at(0, b"persistent data").unwrap();
            store.sync().unwrap();
        }

        {
            let store = FileStore::open(&path).unwrap();
            assert_eq!(store.len().unwrap(), 15);

            let data = store.read_at(0, 15).unwrap();
            assert_eq!(&data, b"persistent data");
        }
    }

    #[test]
    fn file_empty_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"x").unwrap();

        store.write_at(1, b"").unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn file_empty_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"hello").unwrap();

        let data = store.read_at(2, 0).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("test.bin");

        let store = FileStore::open_with_create_dirs(&path).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"hello world").unwrap();

        store.truncate(5).unwrap();
        assert_eq!(store.len().unwrap(), 5);
        assert_eq!(store.read_at(0, 5).unwrap(), b"hello");
    }

    #[test]
    fn file_truncate_to_larger_size_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        store.write_at(0, b"hello").unwrap();

        let result = store.truncate(100);
        assert!(matches!(result, Err(StoreError::TruncateBeyondEnd { .. })));
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.path(), path);
    }
}
