//! Durability and size-limit policy.

use std::time::Duration;

/// Default ceiling for key sizes, in bytes.
pub const DEFAULT_MAX_KEY_BYTES: u32 = 256;

/// Default ceiling for value sizes, in bytes.
pub const DEFAULT_MAX_VALUE_BYTES: u32 = 2048;

/// Tunables controlling append validation and automatic fsync.
///
/// A policy is supplied at open and may be swapped at runtime with
/// [`crate::Wal::set_policy`]. Both sync triggers default to disabled, in
/// which case durability is entirely in the caller's hands via
/// [`crate::Wal::sync`].
///
/// # Example
///
/// ```rust
/// use redolog_core::Policy;
/// use std::time::Duration;
///
/// let policy = Policy::new()
///     .with_max_key_bytes(64)
///     .with_sync_every(Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Maximum accepted key length in bytes. Zero means the default.
    pub max_key_bytes: u32,

    /// Maximum accepted value length in bytes. Zero means the default.
    pub max_value_bytes: u32,

    /// Fsync once this many bytes have been written since the last sync.
    /// Zero disables byte-threshold syncing.
    pub sync_every_bytes: u64,

    /// Fsync on this cadence while there is unsynced data. Zero disables
    /// timed syncing.
    pub sync_every: Duration,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
            sync_every_bytes: 0,
            sync_every: Duration::ZERO,
        }
    }
}

impl Policy {
    /// Creates a policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum key length.
    #[must_use]
    pub const fn with_max_key_bytes(mut self, max: u32) -> Self {
        self.max_key_bytes = max;
        self
    }

    /// Sets the maximum value length.
    #[must_use]
    pub const fn with_max_value_bytes(mut self, max: u32) -> Self {
        self.max_value_bytes = max;
        self
    }

    /// Sets the byte-threshold sync trigger.
    #[must_use]
    pub const fn with_sync_every_bytes(mut self, bytes: u64) -> Self {
        self.sync_every_bytes = bytes;
        self
    }

    /// Sets the timed sync cadence.
    #[must_use]
    pub const fn with_sync_every(mut self, interval: Duration) -> Self {
        self.sync_every = interval;
        self
    }

    /// Returns the policy with zero-valued size limits replaced by the
    /// defaults.
    ///
    /// Applied at open and on every policy swap, so the engine never
    /// operates with a zero size limit.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.max_key_bytes == 0 {
            self.max_key_bytes = DEFAULT_MAX_KEY_BYTES;
        }
        if self.max_value_bytes == 0 {
            self.max_value_bytes = DEFAULT_MAX_VALUE_BYTES;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = Policy::default();
        assert_eq!(policy.max_key_bytes, DEFAULT_MAX_KEY_BYTES);
        assert_eq!(policy.max_value_bytes, DEFAULT_MAX_VALUE_BYTES);
        assert_eq!(policy.sync_every_bytes, 0);
        assert_eq!(policy.sync_every, Duration::ZERO);
    }

    #[test]
    fn builder_pattern() {
        let policy = Policy::new()
            .with_max_key_bytes(64)
            .with_max_value_bytes(1024)
            .with_sync_every_bytes(4096)
            .with_sync_every(Duration::from_millis(100));

        assert_eq!(policy.max_key_bytes, 64);
        assert_eq!(policy.max_value_bytes, 1024);
        assert_eq!(policy.sync_every_bytes, 4096);
        assert_eq!(policy.sync_every, Duration::from_millis(100));
    }

    #[test]
    fn normalized_fills_zero_limits() {
        let policy = Policy::new()
            .with_max_key_bytes(0)
            .with_max_value_bytes(0)
            .normalized();

        assert_eq!(policy.max_key_bytes, DEFAULT_MAX_KEY_BYTES);
        assert_eq!(policy.max_value_bytes, DEFAULT_MAX_VALUE_BYTES);
    }

    #[test]
    fn normalized_keeps_explicit_limits() {
        let policy = Policy::new().with_max_key_bytes(17).normalized();
        assert_eq!(policy.max_key_bytes, 17);
    }
}
