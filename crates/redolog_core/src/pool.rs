//! Reusable byte-buffer pool.
//!
//! Every append needs a scratch buffer for the encoded frame. To keep the
//! hot path allocation-free, each engine owns a pool of buffers sized to
//! the largest frame its open-time policy permits. Requests larger than
//! that capacity fall through to a plain allocation that is simply dropped
//! instead of returned.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// An arena of reusable byte buffers with a fixed per-buffer capacity.
///
/// The pool is owned by a single engine instance, never shared globally.
/// It is nonetheless safe for concurrent `get` calls - it does not rely on
/// the engine's single-writer discipline.
#[derive(Debug)]
pub struct BufferPool {
    capacity: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Creates a pool whose buffers hold `capacity` bytes each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns the fixed per-buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrows a buffer of length `len`.
    ///
    /// If `len` fits the pool capacity the buffer comes from (and returns
    /// to) the pool; otherwise a fresh unpooled buffer is allocated and
    /// dropped normally when the guard goes away.
    pub fn get(&self, len: usize) -> PooledBuf<'_> {
        if len > self.capacity {
            return PooledBuf {
                pool: None,
                buf: vec![0u8; len],
            };
        }

        let mut buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| vec![0u8; self.capacity]);
        buf.truncate(len);

        PooledBuf {
            pool: Some(self),
            buf,
        }
    }

    fn put(&self, mut buf: Vec<u8>) {
        buf.resize(self.capacity, 0);
        self.free.lock().push(buf);
    }

    #[cfg(test)]
    fn free_count(&self) -> usize {
        self.free.lock().len()
    }
}

/// A buffer borrowed from a [`BufferPool`].
///
/// Dereferences to a byte slice of exactly the requested length. Pooled
/// buffers return to the pool on drop with their full capacity restored;
/// oversize buffers are simply freed.
#[derive(Debug)]
pub struct PooledBuf<'a> {
    pool: Option<&'a BufferPool>,
    buf: Vec<u8>,
}

impl PooledBuf<'_> {
    /// Returns true if the buffer came from the pool.
    #[must_use]
    pub fn is_pooled(&self) -> bool {
        self.pool.is_some()
    }
}

impl Deref for PooledBuf<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuf<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool {
            pool.put(std::mem::take(&mut self.buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_within_capacity_is_pooled() {
        let pool = BufferPool::new(64);
        let buf = pool.get(10);
        assert!(buf.is_pooled());
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn get_over_capacity_is_unpooled() {
        let pool = BufferPool::new(64);
        let buf = pool.get(65);
        assert!(!buf.is_pooled());
        assert_eq!(buf.len(), 65);
        drop(buf);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn dropped_buffer_returns_to_pool() {
        let pool = BufferPool::new(64);
        {
            let _buf = pool.get(10);
        }
        assert_eq!(pool.free_count(), 1);

        // The recycled buffer comes back at the requested length
        let buf = pool.get(32);
        assert_eq!(buf.len(), 32);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn buffers_are_writable() {
        let pool = BufferPool::new(16);
        let mut buf = pool.get(4);
        buf.copy_from_slice(b"abcd");
        assert_eq!(&*buf, b"abcd");
    }

    #[test]
    fn full_capacity_request() {
        let pool = BufferPool::new(16);
        let buf = pool.get(16);
        assert!(buf.is_pooled());
        assert_eq!(buf.len(), 16);
    }

    #[test]
    fn concurrent_get_and_drop() {
        use std::sync::Arc;

        let pool = Arc::new(BufferPool::new(64));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    let mut buf = pool.get(32);
                    buf[0] = 0xAB;
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
