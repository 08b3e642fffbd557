/*
# Bits Reader Module

 Utilities for reading big-endian binary data from byte slices, byte-aligned or with
 bit-level precision.

 Key components:
 - Slice readers: `read_u32()`, `read_u64()` with position tracking
 - ByteReader: byte-aligned cursor over a slice that accumulates the first shortfall
 - BitReader: bit-precise reading with error accumulation for codec configuration parsing
*/

use std::io::{self, Read};

/// Mask for the `n` least significant bits.
pub fn mask(n: u32) -> u32 {
    if n == 32 {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

/// Read a 32-bit big endian value from a byte slice advancing the position.
pub fn read_u32(data: &[u8], pos: &mut usize) -> Option<u32> {
    let bytes = data.get(*pos..*pos + 4)?;
    *pos += 4;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a 64-bit big endian value from a byte slice advancing the position.
pub fn read_u64(data: &[u8], pos: &mut usize) -> Option<u64> {
    let bytes = data.get(*pos..*pos + 8)?;
    *pos += 8;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Some(u64::from_be_bytes(buf))
}

/// `ByteReader` walks a byte slice and remembers the first read that ran past
/// the end. Reads after that return zero, so fixed layouts can be decoded
/// field by field and validated once with [`ByteReader::shortfall`].
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    short: Option<usize>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            short: None,
        }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.short.is_some() {
            return None;
        }
        match self.data.get(self.pos..self.pos.saturating_add(n)) {
            Some(bytes) => {
                self.pos += n;
                Some(bytes)
            }
            None => {
                self.short = Some(self.pos.saturating_add(n));
                None
            }
        }
    }

    pub fn read_u8(&mut self) -> u8 {
        self.take(1).map(|b| b[0]).unwrap_or(0)
    }

    pub fn read_u16(&mut self) -> u16 {
        self.take(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .unwrap_or(0)
    }

    pub fn read_u24(&mut self) -> u32 {
        self.take(3)
            .map(|b| ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32)
            .unwrap_or(0)
    }

    pub fn read_u32(&mut self) -> u32 {
        self.take(4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .unwrap_or(0)
    }

    pub fn read_u64(&mut self) -> u64 {
        self.take(8)
            .map(|b| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(b);
                u64::from_be_bytes(buf)
            })
            .unwrap_or(0)
    }

    /// Borrow the next `n` bytes, or an empty slice past the end.
    pub fn read_bytes(&mut self, n: usize) -> &'a [u8] {
        self.take(n).unwrap_or(&[])
    }

    /// Borrow everything that has not been read yet.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let n = self.remaining();
        self.read_bytes(n)
    }

    pub fn skip(&mut self, n: usize) {
        self.take(n);
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Bytes required by the first failed read, paired with the bytes available.
    pub fn shortfall(&self) -> Option<(usize, usize)> {
        self.short.map(|needed| (needed, self.data.len()))
    }
}

/// `BitReader` reads bits from an underlying reader and accumulates the first
/// error that occurs.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    rd: R,
    err: Option<io::Error>,
    n: u32,
    value: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` that starts accumulating errors.
    pub fn new(rd: R) -> Self {
        Self {
            rd,
            err: None,
            n: 0,
            value: 0,
        }
    }

    /// Return the accumulated error if any.
    pub fn acc_error(&self) -> Option<&io::Error> {
        self.err.as_ref()
    }

    /// Read `n` bits and return them as the lowest bits of a `u32`.
    /// If an error has occurred, 0 is returned.
    pub fn read(&mut self, n: u32) -> u32 {
        if self.err.is_some() {
            return 0;
        }
        while self.n < n {
            let mut buf = [0u8; 1];
            match self.rd.read_exact(&mut buf) {
                Ok(()) => {
                    self.value = (self.value << 8) | u64::from(buf[0]);
                    self.n += 8;
                }
                Err(e) => {
                    self.err = Some(e);
                    return 0;
                }
            }
        }
        let value = (self.value >> (self.n - n)) as u32;
        self.n -= n;
        self.value &= (1u64 << self.n) - 1;
        value & mask(n)
    }
}

#[cfg(test)]
mod tests {
    use super::{mask, read_u32, read_u64, BitReader, ByteReader};
    use std::io::Cursor;

    #[test]
    fn test_read_bits() {
        let data = [0xffu8, 0x0f];
        let mut r = BitReader::new(Cursor::new(&data));
        assert_eq!(r.read(2), 3); // 11
        assert_eq!(r.read(3), 7); // 111
        assert_eq!(r.read(5), 28); // 11100
        assert_eq!(r.read(3), 1); // 001
        assert_eq!(r.read(3), 7); // 111
        assert!(r.acc_error().is_none());
        assert_eq!(r.read(1), 0);
        assert!(r.acc_error().is_some());
    }

    #[test]
    fn test_writer_mask() {
        assert_eq!(mask(8), 0xff);
        assert_eq!(mask(4), 0x0f);
        assert_eq!(mask(32), u32::MAX);
    }

    #[test]
    fn test_slice_readers() {
        let data = [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2];
        let mut pos = 0;
        assert_eq!(read_u32(&data, &mut pos), Some(1));
        assert_eq!(read_u64(&data, &mut pos), Some(2));
        assert_eq!(read_u32(&data, &mut pos), None);
        assert_eq!(pos, 12);
    }

    #[test]
    fn test_byte_reader_fields() {
        let data = [1u8, 0x00, 0x02, 0x00, 0x00, 0x03, 0xde, 0xad, 0xbe, 0xef];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u8(), 1);
        assert_eq!(r.read_u16(), 2);
        assert_eq!(r.read_u24(), 3);
        assert_eq!(r.read_u32(), 0xdeadbeef);
        assert_eq!(r.remaining(), 0);
        assert!(r.shortfall().is_none());
    }

    #[test]
    fn test_byte_reader_records_first_shortfall() {
        let data = [0u8; 6];
        let mut r = ByteReader::new(&data);
        r.skip(4);
        assert_eq!(r.read_u32(), 0);
        assert_eq!(r.read_u8(), 0);
        assert_eq!(r.shortfall(), Some((8, 6)));
        assert_eq!(r.position(), 4);
    }
}
