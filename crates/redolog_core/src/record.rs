//! Record framing and checksumming.
//!
//! Each record is framed as:
//!
//! ```text
//! | size (4) | lsn (8) | ts (8) | klen (4) | vlen (4) | key | value | crc32c (4) |
//! ```
//!
//! `size` counts every byte after the size field including the trailing
//! checksum. The CRC32C (Castagnoli polynomial) covers every byte between
//! the size field and the checksum field. Records are immutable once
//! written.

use crate::codec::{Decoder, Encoder};
use crate::error::{WalError, WalResult};
use crate::policy::Policy;
use crate::types::Lsn;

/// Length of the frame's size prefix.
pub const SIZE_PREFIX_LEN: usize = 4;

/// Length of the fixed fields after the size prefix: lsn + ts + klen + vlen.
pub const FIXED_FIELDS_LEN: usize = 8 + 8 + 4 + 4;

/// Length of the trailing checksum.
pub const CRC_LEN: usize = 4;

/// The smallest possible frame body (empty key and value).
pub const MIN_BODY_LEN: usize = FIXED_FIELDS_LEN + CRC_LEN;

/// Returns the frame body length for the given key and value lengths.
///
/// This is the value stored in the size prefix: everything after the
/// prefix, checksum included.
#[must_use]
pub fn body_len(key_len: usize, value_len: usize) -> usize {
    FIXED_FIELDS_LEN + key_len + value_len + CRC_LEN
}

/// Returns the full on-disk frame length for the given key and value
/// lengths, size prefix included.
#[must_use]
pub fn frame_len(key_len: usize, value_len: usize) -> usize {
    SIZE_PREFIX_LEN + body_len(key_len, value_len)
}

/// Returns the largest frame the given policy permits.
///
/// Engines size their buffer pool to this at open.
#[must_use]
pub fn max_frame_len(policy: &Policy) -> usize {
    frame_len(policy.max_key_bytes as usize, policy.max_value_bytes as usize)
}

/// The decoded fields of a valid record, borrowing from its frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFields<'a> {
    /// Caller-assigned logical sequence number.
    pub lsn: Lsn,
    /// Caller-assigned timestamp; non-negative by construction.
    pub ts: i64,
    /// Record key.
    pub key: &'a [u8],
    /// Record value.
    pub value: &'a [u8],
}

/// Outcome of decoding a frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// The record decoded and its checksum matched.
    Valid(RecordFields<'a>),
    /// The stored checksum does not match the payload.
    ///
    /// During replay this marks the end of valid data, not a fault.
    ChecksumMismatch {
        /// The checksum stored on disk.
        expected: u32,
        /// The checksum computed over the payload.
        actual: u32,
    },
    /// The body is too short or its field lengths overrun the frame.
    ///
    /// The expected shape of a crash mid-write; ends replay cleanly.
    Incomplete,
}

/// Encodes every field of a frame except the trailing checksum.
///
/// `buf` must be exactly `frame_len(key.len(), value.len())` bytes; the
/// caller sizes it from the same calculation that validated the record.
pub fn encode_frame(buf: &mut [u8], lsn: Lsn, ts: i64, key: &[u8], value: &[u8]) {
    debug_assert_eq!(buf.len(), frame_len(key.len(), value.len()));
    debug_assert!(ts >= 0);

    let body = body_len(key.len(), value.len());
    let mut enc = Encoder::new(buf);
    enc.u32(body as u32);
    enc.u64(lsn.as_u64());
    enc.u64(ts as u64);
    enc.u32(key.len() as u32);
    enc.u32(value.len() as u32);
    enc.bytes(key);
    enc.bytes(value);
    // The remaining CRC_LEN bytes are written by finalize_crc
}

/// Computes the CRC32C over the frame's payload region and writes it into
/// the last four bytes.
pub fn finalize_crc(buf: &mut [u8]) {
    let crc_at = buf.len() - CRC_LEN;
    let crc = crc32c::crc32c(&buf[SIZE_PREFIX_LEN..crc_at]);
    buf[crc_at..].copy_from_slice(&crc.to_le_bytes());
}

/// Decodes a frame body (the bytes after the size prefix, checksum
/// included).
///
/// The checksum is verified before any field is interpreted. Truncated or
/// garbled bodies come back as [`Decoded::Incomplete`] and checksum
/// failures as [`Decoded::ChecksumMismatch`]; neither is an error, because
/// both are consistent with a tail that never became durable.
///
/// # Errors
///
/// Returns [`WalError::TimestampTooBig`] if the wire timestamp does not
/// fit a signed 64-bit value - a logically impossible record, not a torn
/// write.
pub fn decode_body(body: &[u8]) -> WalResult<Decoded<'_>> {
    if body.len() < MIN_BODY_LEN {
        return Ok(Decoded::Incomplete);
    }

    let crc_at = body.len() - CRC_LEN;
    let payload = &body[..crc_at];
    let expected = u32::from_le_bytes([
        body[crc_at],
        body[crc_at + 1],
        body[crc_at + 2],
        body[crc_at + 3],
    ]);
    let actual = crc32c::crc32c(payload);
    if expected != actual {
        return Ok(Decoded::ChecksumMismatch { expected, actual });
    }

    let mut dec = Decoder::new(payload);
    let (Some(lsn), Some(ts_raw), Some(klen), Some(vlen)) =
        (dec.u64(), dec.u64(), dec.u32(), dec.u32())
    else {
        return Ok(Decoded::Incomplete);
    };

    if ts_raw > i64::MAX as u64 {
        return Err(WalError::TimestampTooBig { ts: ts_raw });
    }

    let (Some(key), Some(value)) = (dec.bytes(klen as usize), dec.bytes(vlen as usize)) else {
        return Ok(Decoded::Incomplete);
    };

    // Field lengths must account for the payload exactly
    if dec.remaining() != 0 {
        return Ok(Decoded::Incomplete);
    }

    Ok(Decoded::Valid(RecordFields {
        lsn: Lsn::new(lsn),
        ts: ts_raw as i64,
        key,
        value,
    }))
}
