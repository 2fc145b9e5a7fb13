//! Error types for redolog core.

use std::io;
use thiserror::Error;

/// Result type for log operations.
pub type WalResult<T> = Result<T, WalError>;

/// Errors that can occur in log operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] redolog_storage::StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is too short or too mangled to be a log at all.
    #[error("invalid log: {message}")]
    InvalidLog {
        /// Description of the problem.
        message: String,
    },

    /// A header is present but fails validation.
    #[error("invalid header: {message}")]
    InvalidHeader {
        /// Description of the problem.
        message: String,
    },

    /// The key exceeds the policy limit.
    #[error("key too large: {len} bytes exceeds limit of {max}")]
    KeyTooLarge {
        /// Length of the rejected key.
        len: usize,
        /// The configured limit.
        max: u32,
    },

    /// The value exceeds the policy limit.
    #[error("value too large: {len} bytes exceeds limit of {max}")]
    ValueTooLarge {
        /// Length of the rejected value.
        len: usize,
        /// The configured limit.
        max: u32,
    },

    /// The caller supplied a negative timestamp.
    #[error("timestamp is negative: {ts}")]
    TimestampNegative {
        /// The rejected timestamp.
        ts: i64,
    },

    /// A wire timestamp does not fit a signed 64-bit value.
    #[error("timestamp exceeds signed 64-bit range: {ts:#x}")]
    TimestampTooBig {
        /// The raw wire value.
        ts: u64,
    },

    /// The framed record would be too large to encode.
    #[error("record too large: {len} bytes exceeds limit of {max}")]
    RecordTooLarge {
        /// Total frame length of the rejected record.
        len: usize,
        /// The maximum encodable frame length.
        max: usize,
    },

    /// The log's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The log is closed.
    #[error("log is closed")]
    Closed,

    /// Another process holds the log's writer lock.
    #[error("log is locked: another process has exclusive access")]
    Locked,

    /// A replay callback failed.
    #[error("replay callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WalError {
    /// Creates an invalid-log error.
    pub fn invalid_log(message: impl Into<String>) -> Self {
        Self::InvalidLog {
            message: message.into(),
        }
    }

    /// Creates an invalid-header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Wraps a caller error from a replay callback.
    pub fn callback(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Callback(err.into())
    }
}
