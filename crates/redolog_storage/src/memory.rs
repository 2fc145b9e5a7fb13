//! In-memory store for testing.

use crate::error::{StoreError, StoreResult};
use crate::store::LogStore;
use parking_lot::RwLock;

/// An in-memory store.
///
/// This store keeps all data in memory and is suitable for:
/// - Unit tests
/// - Crash and corruption simulation (via [`MemStore::corrupt_byte`])
/// - Ephemeral logs that don't need persistence
///
/// # Thread Safety
///
/// The store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use redolog_storage::{LogStore, MemStore};
///
/// let store = MemStore::new();
/// store.write_at(0, b"test data").unwrap();
/// assert_eq!(store.len().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct MemStore {
    data: RwLock<Vec<u8>>,
}

impl MemStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store with pre-existing data.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the store.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Flips every bit of the byte at `offset`.
    ///
    /// Simulates on-media corruption for recovery tests. Panics if `offset`
    /// is beyond the current length.
    pub fn corrupt_byte(&self, offset: u64) {
        let mut data = self.data.write();
        let byte = &mut data[offset as usize];
        *byte = !*byte;
    }
}

impl LogStore for MemStore {
    fn read_at(&self, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let offset_usize = offset as usize;
        let end = offset_usize.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StoreError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset_usize..end].to_vec())
    }

    fn write_at(&self, offset: u64, new_data: &[u8]) -> StoreResult<()> {
        if new_data.is_empty() {
            return Ok(());
        }

        let mut data = self.data.write();
        let end = offset as usize + new_data.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[offset as usize..end].copy_from_slice(new_data);
        Ok(())
    }

    fn sync(&self) -> StoreResult<()> {
        // Nothing buffered; memory is as durable as it gets
        Ok(())
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn truncate(&self, new_len: u64) -> StoreResult<()> {
        let mut data = self.data.write();
        let size = data.len() as u64;

        if new_len > size {
            return Err(StoreError::TruncateBeyondEnd { new_len, size });
        }

        data.truncate(new_len as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let store = MemStore::new();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.is_empty().unwrap());
        assert!(store.data().is_empty());
    }

    #[test]
    fn memory_write_extends() {
        let store = MemStore::new();

        store.write_at(0, b"hello").unwrap();
        store.write_at(5, b" world").unwrap();

        assert_eq!(store.len().unwrap(), 11);
        assert_eq!(store.read_at(0, 11).unwrap(), b"hello world");
    }

    #[test]
    fn memory_write_past_end_zero_fills() {
        let store = MemStore::new();
        store.write_at(4, b"ab").unwrap();

        assert_eq!(store.len().unwrap(), 6);
        assert_eq!(store.read_at(0, 6).unwrap(), b"\0\0\0\0ab");
    }

    #[test]
    fn memory_read_at_returns_correct_data() {
        let store = MemStore::new();
        store.write_at(0, b"hello world").unwrap();

        let data = store.read_at(0, 5).unwrap();
        assert_eq!(&data, b"hello");

        let data = store.read_at(6, 5).unwrap();
        assert_eq!(&data, b"world");
    }

    #[test]
    fn memory_read_past_end_fails() {
        let store = MemStore::new();
        store.write_at(0, b"hello").unwrap();

        let result = store.read_at(10, 5);
        assert!(matches!(result, Err(StoreError::ReadPastEnd { .. })));

        let result = store.read_at(3, 10);
        assert!(matches!(result, Err(StoreError::ReadPastEnd { .. })));
    }

    #[test]
    fn memory_with_data() {
        let store = MemStore::with_data(b"preloaded".to_vec());
        assert_eq!(store.len().unwrap(), 9);
        assert_eq!(store.read_at(0, 9).unwrap(), b"preloaded");
    }

    #[test]
    fn memory_corrupt_byte() {
        let store = MemStore::with_data(vec![0xFF, 0x00]);
        store.corrupt_byte(0);
        assert_eq!(store.data(), vec![0x00, 0x00]);
    }

    #[test]
    fn memory_truncate() {
        let store = MemStore::new();
        store.write_at(0, b"hello world").unwrap();

        store.truncate(5).unwrap();
        assert_eq!(store.len().unwrap(), 5);
        assert_eq!(store.read_at(0, 5).unwrap(), b"hello");
    }

    #[test]
    fn memory_truncate_to_larger_size_fails() {
        let store = MemStore::new();
        store.write_at(0, b"hello").unwrap();

        let result = store.truncate(100);
        assert!(matches!(result, Err(StoreError::TruncateBeyondEnd { .. })));
    }

    #[test]
    fn memory_sync_succeeds() {
        let store = MemStore::new();
        store.write_at(0, b"data").unwrap();
        assert!(store.sync().is_ok());
    }
}
