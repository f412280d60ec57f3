//! Wire buffers: a capacity-capped sequential writer and a zero-copy
//! sequential reader.
//!
//! [`WireWriter`] never grows past the capacity it was created with. An
//! encode that would overflow returns
//! [`OmmError::BufferTooSmall`](crate::error::OmmError::BufferTooSmall) and
//! the caller retries with a larger buffer; [`encode_with_growth`] packages
//! that retry loop for callers that want an owned result.
//!
//! [`WireCursor`] reads over [`Bytes`], so sub-buffers handed out for
//! attrib/payload passthrough share storage with the parent buffer instead
//! of copying.

use bytes::{Bytes, BytesMut};

use crate::error::{OmmError, Result};

/// Marker value that escapes a u16ob length into its three-byte form.
const U16OB_ESCAPE: u8 = 0xFE;

/// Sequential big-endian writer with a fixed capacity.
#[derive(Debug)]
pub struct WireWriter {
    buf: BytesMut,
    capacity: usize,
}

impl WireWriter {
    /// Creates a writer that will refuse to exceed `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Capacity this writer was created with.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available before the capacity is reached.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    fn ensure(&mut self, extra: usize) -> Result<()> {
        let needed = self.buf.len() + extra;
        if needed > self.capacity {
            return Err(OmmError::BufferTooSmall {
                needed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Writes a single byte.
    pub fn put_u8(&mut self, v: u8) -> Result<()> {
        self.ensure(1)?;
        self.buf.extend_from_slice(&[v]);
        Ok(())
    }

    /// Writes a signed byte.
    pub fn put_i8(&mut self, v: i8) -> Result<()> {
        self.put_u8(v as u8)
    }

    /// Writes a u16 in big-endian.
    pub fn put_u16(&mut self, v: u16) -> Result<()> {
        self.ensure(2)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    /// Writes an i16 in big-endian.
    pub fn put_i16(&mut self, v: i16) -> Result<()> {
        self.ensure(2)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    /// Writes a u32 in big-endian.
    pub fn put_u32(&mut self, v: u32) -> Result<()> {
        self.ensure(4)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    /// Writes an i32 in big-endian.
    pub fn put_i32(&mut self, v: i32) -> Result<()> {
        self.ensure(4)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    /// Writes a u64 in big-endian.
    pub fn put_u64(&mut self, v: u64) -> Result<()> {
        self.ensure(8)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    /// Writes raw bytes.
    pub fn put_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.ensure(src.len())?;
        self.buf.extend_from_slice(src);
        Ok(())
    }

    /// Writes a u15 length prefix: one byte below 0x80, two bytes with the
    /// high bit set otherwise. Values of 0x8000 and above do not fit.
    pub fn put_u15(&mut self, v: u16) -> Result<()> {
        if v < 0x80 {
            self.put_u8(v as u8)
        } else if v < 0x8000 {
            self.put_u16(v | 0x8000)
        } else {
            Err(OmmError::InvalidData(format!("u15 value {v} out of range")))
        }
    }

    /// Writes a u16ob ("optimized byte") length: one byte below 0xFE, else
    /// an 0xFE marker followed by the full u16.
    pub fn put_u16ob(&mut self, v: u16) -> Result<()> {
        if v < U16OB_ESCAPE as u16 {
            self.put_u8(v as u8)
        } else {
            self.put_u8(U16OB_ESCAPE)?;
            self.put_u16(v)
        }
    }

    /// Writes a u15-length-prefixed byte buffer.
    pub fn put_buf15(&mut self, src: &[u8]) -> Result<()> {
        if src.len() >= 0x8000 {
            return Err(OmmError::InvalidData(format!(
                "buffer of {} bytes exceeds u15 framing",
                src.len()
            )));
        }
        self.put_u15(src.len() as u16)?;
        self.put_bytes(src)
    }

    /// Writes a u16ob-length-prefixed byte buffer.
    pub fn put_buf16ob(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > u16::MAX as usize {
            return Err(OmmError::InvalidData(format!(
                "buffer of {} bytes exceeds u16 framing",
                src.len()
            )));
        }
        self.put_u16ob(src.len() as u16)?;
        self.put_bytes(src)
    }

    /// Consumes the writer and returns the written bytes.
    #[must_use]
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Sequential big-endian reader over an owned [`Bytes`] buffer.
///
/// Slices handed out by [`WireCursor::take`] share the backing storage of
/// the parent buffer (zero-copy).
#[derive(Debug, Clone)]
pub struct WireCursor {
    data: Bytes,
    pos: usize,
}

impl WireCursor {
    /// Creates a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true when the cursor is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn check(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(OmmError::Incomplete {
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Takes `n` bytes as a zero-copy sub-buffer.
    pub fn take(&mut self, n: usize) -> Result<Bytes> {
        self.check(n)?;
        let out = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Takes everything left as a zero-copy sub-buffer.
    pub fn take_rest(&mut self) -> Bytes {
        let out = self.data.slice(self.pos..);
        self.pos = self.data.len();
        out
    }

    /// Reads a single byte.
    pub fn u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Reads a signed byte.
    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    /// Reads a big-endian u16.
    pub fn u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let v = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    /// Reads a big-endian i16.
    pub fn i16(&mut self) -> Result<i16> {
        Ok(self.u16()? as i16)
    }

    /// Reads a big-endian u32.
    pub fn u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let b = &self.data[self.pos..self.pos + 4];
        let v = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        self.pos += 4;
        Ok(v)
    }

    /// Reads a big-endian i32.
    pub fn i32(&mut self) -> Result<i32> {
        Ok(self.u32()? as i32)
    }

    /// Reads a big-endian u64.
    pub fn u64(&mut self) -> Result<u64> {
        self.check(8)?;
        let b = &self.data[self.pos..self.pos + 8];
        let v = u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
        self.pos += 8;
        Ok(v)
    }

    /// Reads a u15 length prefix (see [`WireWriter::put_u15`]).
    pub fn u15(&mut self) -> Result<u16> {
        let first = self.u8()?;
        if first & 0x80 == 0 {
            Ok(first as u16)
        } else {
            let second = self.u8()?;
            Ok((((first & 0x7F) as u16) << 8) | second as u16)
        }
    }

    /// Reads a u16ob length (see [`WireWriter::put_u16ob`]).
    pub fn u16ob(&mut self) -> Result<u16> {
        let first = self.u8()?;
        if first < U16OB_ESCAPE {
            Ok(first as u16)
        } else {
            self.u16()
        }
    }

    /// Reads a u15-length-prefixed sub-buffer.
    pub fn buf15(&mut self) -> Result<Bytes> {
        let len = self.u15()? as usize;
        self.take(len)
    }

    /// Reads a u16ob-length-prefixed sub-buffer.
    pub fn buf16ob(&mut self) -> Result<Bytes> {
        let len = self.u16ob()? as usize;
        self.take(len)
    }
}

/// Runs `encode` against progressively larger buffers until it fits.
///
/// Growth is driven here, outside the codec itself: each retry doubles the
/// capacity (or jumps straight to the reported requirement). Any error other
/// than `BufferTooSmall` is returned as-is.
pub fn encode_with_growth<F>(initial_capacity: usize, mut encode: F) -> Result<Bytes>
where
    F: FnMut(&mut WireWriter) -> Result<()>,
{
    let mut capacity = initial_capacity.max(32);
    loop {
        let mut writer = WireWriter::new(capacity);
        match encode(&mut writer) {
            Ok(()) => return Ok(writer.freeze()),
            Err(OmmError::BufferTooSmall { needed, .. }) => {
                capacity = needed.max(capacity * 2);
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_respects_capacity() {
        let mut w = WireWriter::new(4);
        w.put_u16(0x1234).unwrap();
        assert_eq!(w.remaining(), 2);
        let err = w.put_u32(1).unwrap_err();
        assert_eq!(
            err,
            OmmError::BufferTooSmall {
                needed: 6,
                capacity: 4
            }
        );
        // The failed write made no partial progress.
        assert_eq!(w.position(), 2);
    }

    #[test]
    fn big_endian_round_trip() {
        let mut w = WireWriter::new(64);
        w.put_u8(0xAB).unwrap();
        w.put_i8(-5).unwrap();
        w.put_u16(0x1234).unwrap();
        w.put_i16(-1000).unwrap();
        w.put_u32(0xDEADBEEF).unwrap();
        w.put_i32(-123456).unwrap();
        w.put_u64(0x0123456789ABCDEF).unwrap();

        let mut c = WireCursor::new(w.freeze());
        assert_eq!(c.u8().unwrap(), 0xAB);
        assert_eq!(c.i8().unwrap(), -5);
        assert_eq!(c.u16().unwrap(), 0x1234);
        assert_eq!(c.i16().unwrap(), -1000);
        assert_eq!(c.u32().unwrap(), 0xDEADBEEF);
        assert_eq!(c.i32().unwrap(), -123456);
        assert_eq!(c.u64().unwrap(), 0x0123456789ABCDEF);
        assert!(c.is_empty());
    }

    #[test]
    fn u15_boundaries() {
        for v in [0u16, 1, 0x7F, 0x80, 0x1234, 0x7FFF] {
            let mut w = WireWriter::new(8);
            w.put_u15(v).unwrap();
            let expected_len = if v < 0x80 { 1 } else { 2 };
            assert_eq!(w.position(), expected_len, "value {v:#x}");
            let mut c = WireCursor::new(w.freeze());
            assert_eq!(c.u15().unwrap(), v);
        }
        let mut w = WireWriter::new(8);
        assert!(w.put_u15(0x8000).is_err());
    }

    #[test]
    fn u16ob_boundaries() {
        for v in [0u16, 0xFD, 0xFE, 0xFF, 0x1234, u16::MAX] {
            let mut w = WireWriter::new(8);
            w.put_u16ob(v).unwrap();
            let expected_len = if v < 0xFE { 1 } else { 3 };
            assert_eq!(w.position(), expected_len, "value {v:#x}");
            let mut c = WireCursor::new(w.freeze());
            assert_eq!(c.u16ob().unwrap(), v);
        }
    }

    #[test]
    fn prefixed_buffers_round_trip() {
        let mut w = WireWriter::new(512);
        w.put_buf15(b"hello").unwrap();
        w.put_buf16ob(&[0x55; 300]).unwrap();
        let mut c = WireCursor::new(w.freeze());
        assert_eq!(&c.buf15().unwrap()[..], b"hello");
        assert_eq!(c.buf16ob().unwrap().len(), 300);
        assert!(c.is_empty());
    }

    #[test]
    fn cursor_incomplete_reports_needs() {
        let mut c = WireCursor::new(Bytes::from_static(&[0x01, 0x02]));
        let err = c.u32().unwrap_err();
        assert_eq!(
            err,
            OmmError::Incomplete {
                needed: 4,
                remaining: 2
            }
        );
    }

    #[test]
    fn take_is_zero_copy_slice() {
        let data = Bytes::from_static(b"abcdefgh");
        let mut c = WireCursor::new(data);
        let head = c.take(3).unwrap();
        assert_eq!(&head[..], b"abc");
        assert_eq!(&c.take_rest()[..], b"defgh");
        assert!(c.is_empty());
    }

    #[test]
    fn growth_helper_retries_until_fit() {
        let payload = [0x42u8; 100];
        let out = encode_with_growth(8, |w| w.put_bytes(&payload)).unwrap();
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn growth_helper_propagates_real_errors() {
        let err = encode_with_growth(8, |_w| {
            Err(OmmError::InvalidData("bad month".into()))
        })
        .unwrap_err();
        assert!(matches!(err, OmmError::InvalidData(_)));
    }
}
