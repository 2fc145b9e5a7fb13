//! # redolog core
//!
//! A single-writer, crash-safe, append-only write-ahead log (WAL).
//!
//! The log durably records key/value mutations tagged with an
//! application-supplied logical sequence number (LSN) so that in-memory
//! state can be rebuilt deterministically after a crash or restart.
//!
//! ## On-Disk Format
//!
//! A log file starts with a fixed 24-byte header:
//!
//! ```text
//! | magic (4) | version (4) | features (8) | created_at (8) |
//! ```
//!
//! followed by a sequence of framed records, all integers little-endian:
//!
//! ```text
//! | size (4) | lsn (8) | ts (8) | klen (4) | vlen (4) | key | value | crc32c (4) |
//! ```
//!
//! `size` counts every byte after the size field including the trailing
//! checksum. The CRC32C (Castagnoli) covers every byte between the size
//! field and the checksum field.
//!
//! ## Recovery Policy
//!
//! Replay distinguishes between **tolerated** and **fatal** conditions:
//!
//! - **Tolerated (treated as clean end-of-log)**: a short size prefix, a
//!   record body extending past the tail, a checksum mismatch, or field
//!   bounds that overrun the frame. These are the expected shape of a crash
//!   mid-write; replay stops and returns everything validly applied.
//! - **Fatal**: a decoded timestamp wider than a signed 64-bit value. That
//!   cannot be produced by a torn write of a valid record and aborts replay
//!   with [`WalError::TimestampTooBig`].
//!
//! ## Single-Writer Contract
//!
//! At most one [`Wal`] instance may write a given file; an advisory sidecar
//! lock enforces this across processes. Within a process one mutex
//! serializes every mutating operation, while [`Wal::replay`] scans without
//! the mutex because bytes behind the snapshotted tail are immutable.
//!
//! ## Example
//!
//! ```no_run
//! use redolog_core::{CancelToken, Lsn, Policy, Wal};
//!
//! let wal = Wal::open("data/app.wal", Policy::default(), CancelToken::new()).unwrap();
//! wal.append(Lsn::new(1), 1_700_000_000, b"k1", b"v1").unwrap();
//! wal.sync().unwrap();
//!
//! let max = wal
//!     .replay(Lsn::new(0), |lsn, ts, key, value| {
//!         println!("{lsn} {ts} {key:?} {value:?}");
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(max, Lsn::new(1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod codec;
pub mod error;
pub mod header;
pub mod policy;
pub mod pool;
pub mod record;
pub mod types;
pub mod wal;

pub use cancel::CancelToken;
pub use error::{WalError, WalResult};
pub use header::Header;
pub use policy::Policy;
pub use types::Lsn;
pub use wal::Wal;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
