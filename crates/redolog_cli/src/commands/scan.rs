//! Read-only log scanner shared by the inspect, verify, and dump commands.
//!
//! The scanner opens the file directly, without the engine or its writer
//! lock, so it can examine a log another process is still appending to.
//! Bytes below the length observed at open are immutable, which makes the
//! lock-free read safe.

use redolog_core::header::{Header, HEADER_LEN};
use redolog_core::record::{self, Decoded, RecordFields};
use redolog_core::{WalError, WalResult};
use redolog_storage::{FileStore, LogStore};
use std::path::Path;
use tracing::debug;

/// Why the scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// Every byte up to the file length decoded as a valid record.
    CleanEnd,
    /// The last record is cut short, as a crash mid-write leaves it.
    TornTail,
    /// A record's stored checksum does not match its payload.
    ChecksumMismatch,
    /// A record's field lengths do not account for its frame.
    Garbled,
    /// A record carries a timestamp wider than a signed 64-bit value.
    TimestampOverflow,
}

impl ScanStop {
    /// Short human-readable description.
    pub fn describe(self) -> &'static str {
        match self {
            Self::CleanEnd => "clean",
            Self::TornTail => "torn tail (crash artifact)",
            Self::ChecksumMismatch => "checksum mismatch",
            Self::Garbled => "garbled record",
            Self::TimestampOverflow => "timestamp overflow",
        }
    }
}

/// Summary of a completed scan.
#[derive(Debug)]
pub struct ScanReport {
    /// The decoded file header.
    pub header: Header,
    /// Total file length in bytes.
    pub file_len: u64,
    /// Number of valid records.
    pub records: u64,
    /// Highest LSN among valid records.
    pub max_lsn: u64,
    /// Offset one past the last valid record.
    pub valid_up_to: u64,
    /// Why the scan stopped.
    pub stop: ScanStop,
}

impl ScanReport {
    /// Number of unreplayable bytes at the end of the file.
    pub fn trailing_bytes(&self) -> u64 {
        self.file_len - self.valid_up_to
    }
}

/// Scans the log at `path`, invoking `on_record` for every valid record.
///
/// The callback returns `true` to continue or `false` to stop early; an
/// early stop reports [`ScanStop::CleanEnd`].
///
/// # Errors
///
/// Returns an error for an unreadable file, a missing or invalid header,
/// or an I/O failure mid-scan. Torn or corrupt records are reported in the
/// [`ScanReport`], not as errors.
pub fn scan_log<F>(path: &Path, mut on_record: F) -> WalResult<ScanReport>
where
    F: FnMut(u64, RecordFields<'_>) -> bool,
{
    let store = FileStore::open(path)?;
    let file_len = store.len()?;
    debug!(path = %path.display(), file_len, "scanning log");

    let header = Header::read_from(&store)?;

    let mut offset = HEADER_LEN as u64;
    let mut records = 0u64;
    let mut max_lsn = 0u64;
    let mut stop = ScanStop::CleanEnd;

    while offset < file_len {
        if file_len - offset < record::SIZE_PREFIX_LEN as u64 {
            stop = ScanStop::TornTail;
            break;
        }

        let prefix = store.read_at(offset, record::SIZE_PREFIX_LEN)?;
        let body_len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as u64;

        if file_len - offset - (record::SIZE_PREFIX_LEN as u64) < body_len {
            stop = ScanStop::TornTail;
            break;
        }

        let body = store.read_at(offset + record::SIZE_PREFIX_LEN as u64, body_len as usize)?;

        match record::decode_body(&body) {
            Ok(Decoded::Valid(fields)) => {
                records += 1;
                if fields.lsn.as_u64() > max_lsn {
                    max_lsn = fields.lsn.as_u64();
                }
                let keep_going = on_record(offset, fields);
                offset += record::SIZE_PREFIX_LEN as u64 + body_len;
                if !keep_going {
                    break;
                }
            }
            Ok(Decoded::ChecksumMismatch { .. }) => {
                stop = ScanStop::ChecksumMismatch;
                break;
            }
            Ok(Decoded::Incomplete) => {
                stop = ScanStop::Garbled;
                break;
            }
            Err(WalError::TimestampTooBig { .. }) => {
                stop = ScanStop::TimestampOverflow;
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(ScanReport {
        header,
        file_len,
        records,
        max_lsn,
        valid_up_to: offset,
        stop,
    })
}
