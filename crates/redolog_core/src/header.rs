//! Log file header.
//!
//! A log file starts with a fixed 24-byte header written exactly once, when
//! the file is created, and validated on every subsequent open:
//!
//! ```text
//! | magic (4) | version (4) | features (8) | created_at (8) |
//! ```
//!
//! A header that fails validation makes the whole file unusable; there is
//! no heuristic repair.

use crate::codec::{Decoder, Encoder};
use crate::error::{WalError, WalResult};
use redolog_storage::LogStore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Magic constant identifying a redolog file ("RDLG" on disk).
pub const LOG_MAGIC: u32 = u32::from_le_bytes(*b"RDLG");

/// Current log format version.
pub const LOG_VERSION: u32 = 1;

/// Feature bit: records carry CRC32C checksums. Always set by this version.
pub const FEATURE_CRC32C: u64 = 1;

/// Encoded header size in bytes.
pub const HEADER_LEN: usize = 24;

/// The fixed-size log file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format magic; must equal [`LOG_MAGIC`].
    pub magic: u32,
    /// Format version; must be within `[1, LOG_VERSION]`.
    pub version: u32,
    /// Feature bitmask; bit 0 = CRC32C enabled.
    pub features: u64,
    /// Creation time in unix seconds. Informational only.
    pub created_at: u64,
}

impl Header {
    /// Creates a header for a freshly created log file.
    #[must_use]
    pub fn new() -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            magic: LOG_MAGIC,
            version: LOG_VERSION,
            features: FEATURE_CRC32C,
            created_at,
        }
    }

    /// Returns true if the header identifies a log this version can operate
    /// on: exact magic match and a version in `[1, LOG_VERSION]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.magic == LOG_MAGIC && self.version >= 1 && self.version <= LOG_VERSION
    }

    /// Returns true if records carry CRC32C checksums.
    #[must_use]
    pub fn has_crc32c(&self) -> bool {
        self.features & FEATURE_CRC32C != 0
    }

    /// Serializes the header.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        let mut enc = Encoder::new(&mut buf);
        enc.u32(self.magic);
        enc.u32(self.version);
        enc.u64(self.features);
        enc.u64(self.created_at);
        buf
    }

    /// Deserializes a header, or `None` if `buf` holds fewer than
    /// [`HEADER_LEN`] bytes.
    ///
    /// Decoding does not validate; call [`Header::is_valid`] on the result.
    #[must_use]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let mut dec = Decoder::new(buf);
        Some(Self {
            magic: dec.u32()?,
            version: dec.u32()?,
            features: dec.u64()?,
            created_at: dec.u64()?,
        })
    }

    /// Writes the header at offset 0 and fsyncs it.
    ///
    /// Called exactly once, when the file is empty.
    ///
    /// # Errors
    ///
    /// Returns a wrapped I/O error if the write or sync fails.
    pub fn write_to(&self, store: &dyn LogStore) -> WalResult<()> {
        store.write_at(0, &self.encode())?;
        store.sync()?;
        Ok(())
    }

    /// Reads and validates the header of an existing log.
    ///
    /// # Errors
    ///
    /// Returns [`WalError::InvalidLog`] for a store too short to contain a
    /// header and [`WalError::InvalidHeader`] for a header that is present
    /// but fails validation.
    pub fn read_from(store: &dyn LogStore) -> WalResult<Self> {
        let len = store.len()?;
        if len < HEADER_LEN as u64 {
            return Err(WalError::invalid_log(format!(
                "{len} bytes is too short to contain a log header"
            )));
        }

        let buf = store.read_at(0, HEADER_LEN)?;
        let header =
            Self::decode(&buf).ok_or_else(|| WalError::invalid_log("short header read"))?;
        if !header.is_valid() {
            return Err(WalError::invalid_header(format!(
                "magic {:#010x}, version {}",
                header.magic, header.version
            )));
        }

        Ok(header)
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
