//! Little-endian fixed-width binary codec.
//!
//! Stateless helpers operating over a byte buffer with a cursor. The
//! encoder writes into a buffer the caller has already sized from the
//! record-size calculation, so its writes are not bounds-checked beyond
//! Rust's own slice checks. The decoder consumes untrusted bytes read from
//! disk - possibly truncated by a crash - so every read is bounds-checked
//! and signals exhaustion with `None` instead of panicking.

/// Cursor-advancing writer of little-endian integers.
///
/// The caller guarantees the buffer is large enough for every write; the
/// writer side owns the size calculation, so running out of room is a
/// programming error, not a runtime condition.
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Writes a `u32`, advancing the cursor by 4.
    pub fn u32(&mut self, value: u32) {
        self.buf[self.pos..self.pos + 4].copy_from_slice(&value.to_le_bytes());
        self.pos += 4;
    }

    /// Writes a `u64`, advancing the cursor by 8.
    pub fn u64(&mut self, value: u64) {
        self.buf[self.pos..self.pos + 8].copy_from_slice(&value.to_le_bytes());
        self.pos += 8;
    }

    /// Writes raw bytes, advancing the cursor by their length.
    pub fn bytes(&mut self, data: &[u8]) {
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
    }

    /// Returns the current cursor position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Cursor-advancing, bounds-checked reader of little-endian integers.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder positioned at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reads a `u32`, or `None` if fewer than 4 bytes remain.
    pub fn u32(&mut self) -> Option<u32> {
        let bytes: [u8; 4] = self.buf.get(self.pos..self.pos + 4)?.try_into().ok()?;
        self.pos += 4;
        Some(u32::from_le_bytes(bytes))
    }

    /// Reads a `u64`, or `None` if fewer than 8 bytes remain.
    pub fn u64(&mut self) -> Option<u64> {
        let bytes: [u8; 8] = self.buf.get(self.pos..self.pos + 8)?.try_into().ok()?;
        self.pos += 8;
        Some(u64::from_le_bytes(bytes))
    }

    /// Reads `n` raw bytes, or `None` if fewer than `n` remain.
    pub fn bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.buf.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(slice)
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = [0u8; 20];
        let mut enc = Encoder::new(&mut buf);
        enc.u32(0xDEAD_BEEF);
        enc.u64(0x0123_4567_89AB_CDEF);
        enc.bytes(b"tail");
        assert_eq!(enc.position(), 16);

        let mut dec = Decoder::new(&buf);
        assert_eq!(dec.u32(), Some(0xDEAD_BEEF));
        assert_eq!(dec.u64(), Some(0x0123_4567_89AB_CDEF));
        assert_eq!(dec.bytes(4), Some(&b"tail"[..]));
        assert_eq!(dec.remaining(), 4);
    }

    #[test]
    fn encoded_integers_are_little_endian() {
        let mut buf = [0u8; 4];
        Encoder::new(&mut buf).u32(0x0102_0304);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn decode_short_u32() {
        let mut dec = Decoder::new(&[1, 2, 3]);
        assert_eq!(dec.u32(), None);
        // A failed read consumes nothing
        assert_eq!(dec.remaining(), 3);
    }

    #[test]
    fn decode_short_u64() {
        let mut dec = Decoder::new(&[0; 7]);
        assert_eq!(dec.u64(), None);
    }

    #[test]
    fn decode_short_bytes() {
        let mut dec = Decoder::new(b"abc");
        assert_eq!(dec.bytes(2), Some(&b"ab"[..]));
        assert_eq!(dec.bytes(2), None);
        assert_eq!(dec.remaining(), 1);
    }

    #[test]
    fn decode_bytes_huge_request_does_not_overflow() {
        let mut dec = Decoder::new(b"abc");
        assert_eq!(dec.bytes(usize::MAX), None);
    }
}
