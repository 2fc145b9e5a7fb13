//! The log engine.
//!
//! One [`Wal`] instance owns one log file. A single mutex serializes every
//! state-mutating operation (`append`, `sync`, `reset`, `set_policy`, the
//! background flusher's tick); at most one append makes progress at a
//! time, and that is a documented contract, not a convenience. `replay`
//! only takes the mutex to snapshot the tail and then scans unlocked -
//! bytes behind the snapshot are immutable once written, because every
//! write is a positioned write at or beyond the tail.
//!
//! Lifecycle: `Open -> Running -> Closed` (terminal). Operations on a
//! closed engine fail with [`WalError::Closed`].

use crate::cancel::CancelToken;
use crate::error::{WalError, WalResult};
use crate::header::{Header, HEADER_LEN};
use crate::policy::Policy;
use crate::pool::BufferPool;
use crate::record::{self, Decoded};
use crate::types::Lsn;
use fs2::FileExt;
use parking_lot::{Condvar, Mutex};
use redolog_storage::{FileStore, LogStore};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Mutable engine state guarded by the engine mutex.
struct EngineState {
    /// Offset where the next append will write.
    tail: u64,
    /// Tail value at the last successful fsync.
    last_sync_at: u64,
    /// True when bytes have been written since the last fsync.
    dirty: bool,
    /// Current policy.
    policy: Policy,
}

/// State shared with the background flusher.
struct Shared {
    store: Box<dyn LogStore>,
    state: Mutex<EngineState>,
    pool: BufferPool,
    cancel: CancelToken,
    closed: AtomicBool,
}

/// Handle to the background flusher thread.
struct Flusher {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: JoinHandle<()>,
}

/// A single-writer, crash-safe, append-only write-ahead log.
///
/// Records key/value mutations tagged with caller-supplied LSNs for later
/// deterministic replay. See the crate docs for the on-disk format and
/// recovery policy.
///
/// # Example
///
/// ```rust
/// use redolog_core::{CancelToken, Lsn, Policy, Wal};
/// use redolog_storage::MemStore;
///
/// let wal = Wal::with_store(Box::new(MemStore::new()), Policy::default(), CancelToken::new())
///     .unwrap();
/// wal.append(Lsn::new(1), 100, b"k1", b"v1").unwrap();
///
/// let mut seen = Vec::new();
/// wal.replay(Lsn::new(0), |lsn, _, key, _| {
///     seen.push((lsn, key.to_vec()));
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(seen, vec![(Lsn::new(1), b"k1".to_vec())]);
/// ```
pub struct Wal {
    shared: Arc<Shared>,
    flusher: Mutex<Option<Flusher>>,
    /// Advisory sidecar lock enforcing the single-writer contract across
    /// processes. Held for the lifetime of the engine.
    _lock_file: Option<File>,
}

impl Wal {
    /// Opens or creates a log file at `path`.
    ///
    /// A fresh file gets a header written and fsynced; an existing file has
    /// its header validated. Parent directories are created as needed. An
    /// advisory lock on a `<path>.lock` sidecar rejects a second writer
    /// with [`WalError::Locked`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another process holds the sidecar lock
    /// - The file is non-empty but too short to contain a header
    ///   ([`WalError::InvalidLog`])
    /// - The header is present but invalid ([`WalError::InvalidHeader`])
    /// - I/O errors occur
    pub fn open(
        path: impl AsRef<Path>,
        policy: Policy,
        cancel: CancelToken,
    ) -> WalResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock_file = Self::acquire_lock(path)?;
        let store = FileStore::open(path)?;

        let mut wal = Self::with_store(Box::new(store), policy, cancel)?;
        wal._lock_file = Some(lock_file);
        Ok(wal)
    }

    /// Opens a log over an arbitrary store.
    ///
    /// Used by tests to drive the engine over an in-memory store; no
    /// cross-process lock is taken.
    ///
    /// # Errors
    ///
    /// Same as [`Wal::open`], minus the lock.
    pub fn with_store(
        store: Box<dyn LogStore>,
        policy: Policy,
        cancel: CancelToken,
    ) -> WalResult<Self> {
        let policy = policy.normalized();
        let len = store.len()?;

        if len == 0 {
            let header = Header::new();
            header.write_to(store.as_ref())?;
            debug!(version = header.version, "created new log");
        } else {
            let header = Header::read_from(store.as_ref())?;
            debug!(version = header.version, tail = len, "opened existing log");
        }

        let tail = store.len()?;
        let pool = BufferPool::new(record::max_frame_len(&policy));
        let sync_every = policy.sync_every;

        let shared = Arc::new(Shared {
            store,
            state: Mutex::new(EngineState {
                tail,
                last_sync_at: tail,
                dirty: false,
                policy,
            }),
            pool,
            cancel,
            closed: AtomicBool::new(false),
        });

        let wal = Self {
            shared,
            flusher: Mutex::new(None),
            _lock_file: None,
        };

        if sync_every > Duration::ZERO {
            wal.start_flusher(sync_every);
        }

        Ok(wal)
    }

    /// Appends one record at the current tail.
    ///
    /// Validates the inputs against the current policy, encodes and
    /// checksums the frame in a pooled buffer, writes it with a positioned
    /// write at the tail, and advances the tail. If the policy's byte
    /// threshold is crossed the write is fsynced before returning.
    ///
    /// # Errors
    ///
    /// Returns a validation error (`KeyTooLarge`, `ValueTooLarge`,
    /// `TimestampNegative`, `RecordTooLarge`) without touching disk,
    /// `Cancelled` if the engine's token fired, `Closed` after close, or a
    /// wrapped I/O error.
    pub fn append(&self, lsn: Lsn, ts: i64, key: &[u8], value: &[u8]) -> WalResult<()> {
        self.check_closed()?;
        if self.shared.cancel.is_cancelled() {
            return Err(WalError::Cancelled);
        }
        if ts < 0 {
            return Err(WalError::TimestampNegative { ts });
        }

        let mut state = self.shared.state.lock();

        if key.len() > state.policy.max_key_bytes as usize {
            return Err(WalError::KeyTooLarge {
                len: key.len(),
                max: state.policy.max_key_bytes,
            });
        }
        if value.len() > state.policy.max_value_bytes as usize {
            return Err(WalError::ValueTooLarge {
                len: value.len(),
                max: state.policy.max_value_bytes,
            });
        }

        let body_len = record::body_len(key.len(), value.len());
        if body_len > u32::MAX as usize {
            return Err(WalError::RecordTooLarge {
                len: body_len,
                max: u32::MAX as usize,
            });
        }

        let frame_len = record::frame_len(key.len(), value.len());
        let mut buf = self.shared.pool.get(frame_len);
        record::encode_frame(&mut buf, lsn, ts, key, value);
        record::finalize_crc(&mut buf);

        self.shared.store.write_at(state.tail, &buf)?;
        state.tail += frame_len as u64;
        state.dirty = true;

        let threshold = state.policy.sync_every_bytes;
        if threshold > 0 && state.tail - state.last_sync_at >= threshold {
            Self::sync_state(self.shared.store.as_ref(), &mut state)?;
        }

        Ok(())
    }

    /// Replays records with an LSN greater than `base_lsn`, in file order.
    ///
    /// The tail is snapshotted under the engine mutex; the scan itself runs
    /// unlocked and may proceed concurrently with appends. The scan ends
    /// cleanly - no error - at the first record that is short, garbled, or
    /// fails its checksum, since all of those are the expected shape of a
    /// crash mid-write.
    ///
    /// Returns the highest LSN handed to `apply`, or `base_lsn` if none
    /// exceeded it.
    ///
    /// # Errors
    ///
    /// Returns [`WalError::TimestampTooBig`] for a logically impossible
    /// wire timestamp, the callback's own error if `apply` fails, or a
    /// wrapped I/O error.
    pub fn replay<F>(&self, base_lsn: Lsn, mut apply: F) -> WalResult<Lsn>
    where
        F: FnMut(Lsn, i64, &[u8], &[u8]) -> WalResult<()>,
    {
        self.check_closed()?;

        let tail = self.shared.state.lock().tail;
        let store = self.shared.store.as_ref();

        let mut offset = HEADER_LEN as u64;
        let mut max_lsn = base_lsn;

        while offset < tail {
            if tail - offset < record::SIZE_PREFIX_LEN as u64 {
                info!(offset, "truncated size prefix at log tail, ending replay");
                break;
            }

            let prefix = store.read_at(offset, record::SIZE_PREFIX_LEN)?;
            let body_len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as u64;

            if tail - offset - (record::SIZE_PREFIX_LEN as u64) < body_len {
                info!(offset, body_len, "incomplete record at log tail, ending replay");
                break;
            }

            let body = store.read_at(offset + record::SIZE_PREFIX_LEN as u64, body_len as usize)?;

            match record::decode_body(&body)? {
                Decoded::Valid(fields) => {
                    if fields.lsn > base_lsn {
                        if let Err(err) = apply(fields.lsn, fields.ts, fields.key, fields.value) {
                            info!(
                                lsn = fields.lsn.as_u64(),
                                %err,
                                "replay callback failed, aborting replay"
                            );
                            return Err(err);
                        }
                        if fields.lsn > max_lsn {
                            max_lsn = fields.lsn;
                        }
                    }
                    offset += record::SIZE_PREFIX_LEN as u64 + body_len;
                }
                Decoded::ChecksumMismatch { expected, actual } => {
                    info!(offset, expected, actual, "record checksum mismatch, ending replay");
                    break;
                }
                Decoded::Incomplete => {
                    info!(offset, "garbled record at log tail, ending replay");
                    break;
                }
            }
        }

        Ok(max_lsn)
    }

    /// Fsyncs if there is unsynced data; a no-op otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after close or a wrapped I/O error.
    pub fn sync(&self) -> WalResult<()> {
        self.check_closed()?;
        let mut state = self.shared.state.lock();
        Self::sync_state(self.shared.store.as_ref(), &mut state)
    }

    /// Truncates the log back to header-only length and force-syncs.
    ///
    /// Destructive: every record is discarded. Intended for "start a fresh
    /// log" use cases.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after close or a wrapped I/O error.
    pub fn reset(&self) -> WalResult<()> {
        self.check_closed()?;
        let mut state = self.shared.state.lock();

        self.shared.store.truncate(HEADER_LEN as u64)?;
        self.shared.store.sync()?;

        state.tail = HEADER_LEN as u64;
        state.last_sync_at = state.tail;
        state.dirty = false;

        debug!("log reset to header-only length");
        Ok(())
    }

    /// Swaps the policy, normalizing it first.
    ///
    /// The background flusher is started, stopped, or retimed as
    /// `sync_every` transitions. The buffer pool keeps its open-time
    /// capacity: limits raised beyond it make oversize appends fall back to
    /// plain allocations, and lowered limits leave the pool oversized,
    /// which is harmless. A no-op on a closed engine.
    pub fn set_policy(&self, policy: Policy) {
        if self.is_closed() {
            return;
        }

        let policy = policy.normalized();
        let new_interval = policy.sync_every;

        let old_interval = {
            let mut state = self.shared.state.lock();
            std::mem::replace(&mut state.policy, policy).sync_every
        };

        if old_interval != new_interval {
            self.stop_flusher();
            if new_interval > Duration::ZERO {
                self.start_flusher(new_interval);
            }
        }
    }

    /// Stops the background flusher, flushes unsynced data, and marks the
    /// engine closed.
    ///
    /// Safe to call more than once; later calls are no-ops. Every other
    /// operation on a closed engine fails with [`WalError::Closed`]. The
    /// file descriptor and sidecar lock are released when the engine is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns a wrapped I/O error if the final flush fails; the engine is
    /// closed regardless.
    pub fn close(&self) -> WalResult<()> {
        self.stop_flusher();

        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut state = self.shared.state.lock();
        Self::sync_state(self.shared.store.as_ref(), &mut state)
    }

    /// Returns the offset where the next append will write.
    #[must_use]
    pub fn tail(&self) -> u64 {
        self.shared.state.lock().tail
    }

    /// Returns a copy of the current policy.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.shared.state.lock().policy.clone()
    }

    /// Returns a clone of the engine's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.shared.cancel.clone()
    }

    /// Returns true if the engine has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    fn check_closed(&self) -> WalResult<()> {
        if self.is_closed() {
            Err(WalError::Closed)
        } else {
            Ok(())
        }
    }

    fn sync_state(store: &dyn LogStore, state: &mut EngineState) -> WalResult<()> {
        if !state.dirty {
            return Ok(());
        }
        store.sync()?;
        state.last_sync_at = state.tail;
        state.dirty = false;
        Ok(())
    }

    fn acquire_lock(path: &Path) -> WalResult<File> {
        let mut lock_path = path.as_os_str().to_os_string();
        lock_path.push(".lock");

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(PathBuf::from(lock_path))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(WalError::Locked);
        }

        Ok(lock_file)
    }

    fn start_flusher(&self, interval: Duration) {
        let shared = Arc::clone(&self.shared);
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let (lock, cvar) = &*thread_stop;
            let mut stopped = lock.lock();
            while !*stopped {
                let timed_out = cvar.wait_for(&mut stopped, interval).timed_out();
                if *stopped || shared.cancel.is_cancelled() {
                    break;
                }
                if timed_out {
                    let mut state = shared.state.lock();
                    if let Err(err) = Wal::sync_state(shared.store.as_ref(), &mut state) {
                        warn!(%err, "periodic flush failed");
                    }
                }
            }
        });

        *self.flusher.lock() = Some(Flusher { stop, handle });
    }

    fn stop_flusher(&self) {
        let flusher = self.flusher.lock().take();
        if let Some(flusher) = flusher {
            {
                let (lock, cvar) = &*flusher.stop;
                *lock.lock() = true;
                cvar.notify_all();
            }
            let _ = flusher.handle.join();
        }
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        // Best-effort: stop the flusher and flush what is dirty
        let _ = self.close();
    }
}

impl fmt::Debug for Wal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Wal")
            .field("tail", &state.tail)
            .field("dirty", &state.dirty)
            .field("policy", &state.policy)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
