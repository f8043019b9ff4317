use std::fmt;

use crate::{BufferError, Endian, WriteBuffer};

/// A capped contiguous output buffer.
///
/// Writes land at the cursor; the high-water length remembers the furthest
/// byte ever written, so the cursor can go back to patch a reserved field
/// without truncating the output.
///
/// ```
/// use tidewire_buffer::{Endian, LinearWriteBuffer, WriteBuffer};
///
/// let mut out = LinearWriteBuffer::new(Endian::Big, 32);
/// out.write_uint16(0).unwrap(); // placeholder
/// out.write_text("hello").unwrap();
/// let size = out.len() - 2;
/// out.skip_to(0).unwrap();
/// out.write_uint16(size as u16).unwrap();
/// assert_eq!(out.to_byte_range(), b"\x00\x05hello");
/// ```
pub struct LinearWriteBuffer {
    data:   Box<[u8]>,
    cursor: usize,
    length: usize,
    endian: Endian,
}

impl LinearWriteBuffer {
    pub fn new(endian: Endian, capacity: usize) -> LinearWriteBuffer {
        LinearWriteBuffer {
            data: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
            length: 0,
            endian,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Copies the finished output out of the buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_byte_range().to_vec()
    }

    #[inline(always)]
    fn put<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), BufferError> {
        self.write(&bytes)
    }
}

impl WriteBuffer for LinearWriteBuffer {
    fn endian(&self) -> Endian {
        self.endian
    }

    fn clear(&mut self) {
        self.cursor = 0;
        self.length = 0;
    }

    fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        if self.length - self.cursor < n {
            return Err(BufferError::Bounds {
                offset:    self.cursor,
                requested: n,
                limit:     self.length,
            });
        }
        self.cursor += n;
        Ok(())
    }

    fn skip_to(&mut self, pos: usize) -> Result<(), BufferError> {
        if pos > self.length {
            return Err(BufferError::Bounds {
                offset:    0,
                requested: pos,
                limit:     self.length,
            });
        }
        self.cursor = pos;
        Ok(())
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.length
    }

    fn to_byte_range(&self) -> &[u8] {
        &self.data[..self.length]
    }

    fn truncate(&mut self, len: usize) -> Result<(), BufferError> {
        if len > self.length {
            return Err(BufferError::Bounds {
                offset:    0,
                requested: len,
                limit:     self.length,
            });
        }
        self.length = len;
        self.cursor = self.cursor.min(len);
        Ok(())
    }

    #[inline(always)]
    fn write(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if data.len() > self.data.len() - self.cursor {
            return Err(BufferError::Bounds {
                offset:    self.cursor,
                requested: data.len(),
                limit:     self.data.len(),
            });
        }
        self.data[self.cursor..self.cursor + data.len()].copy_from_slice(data);
        self.cursor += data.len();
        self.length = self.length.max(self.cursor);
        Ok(())
    }

    fn write_uint8(&mut self, value: u8) -> Result<(), BufferError> {
        self.put([value])
    }

    fn write_uint16(&mut self, value: u16) -> Result<(), BufferError> {
        match self.endian {
            Endian::Big => self.put(value.to_be_bytes()),
            Endian::Little => self.put(value.to_le_bytes()),
        }
    }

    fn write_uint32(&mut self, value: u32) -> Result<(), BufferError> {
        match self.endian {
            Endian::Big => self.put(value.to_be_bytes()),
            Endian::Little => self.put(value.to_le_bytes()),
        }
    }

    fn write_uint64(&mut self, value: &[u8; 8]) -> Result<(), BufferError> {
        let mut bytes = *value;
        if self.endian == Endian::Little {
            bytes.reverse();
        }
        self.put(bytes)
    }
}

impl fmt::Debug for LinearWriteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LinearWriteBuffer")
            .field("capacity", &self.data.len())
            .field("cursor", &self.cursor)
            .field("length", &self.length)
            .field("endian", &self.endian)
            .finish()
    }
}

#[cfg(test)]
fn write_once(endian: Endian, cb: fn(&mut LinearWriteBuffer) -> Result<(), BufferError>) -> Vec<u8> {
    let mut out = LinearWriteBuffer::new(endian, 16);
    cb(&mut out).unwrap();
    out.to_vec()
}

#[test]
fn write_primitives_big_endian() {
    let be = Endian::Big;
    assert_eq!(write_once(be, |out| out.write_int8(-1)), [0xff]);
    assert_eq!(write_once(be, |out| out.write_uint8(0x80)), [0x80]);
    assert_eq!(write_once(be, |out| out.write_int16(-2)), [0xff, 0xfe]);
    assert_eq!(write_once(be, |out| out.write_uint16(0x1234)), [0x12, 0x34]);
    assert_eq!(write_once(be, |out| out.write_int32(-3)), [0xff, 0xff, 0xff, 0xfd]);
    assert_eq!(write_once(be, |out| out.write_uint32(0xdead_beef)), [0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(write_once(be, |out| out.write_float32(1.5)), [0x3f, 0xc0, 0, 0]);
    assert_eq!(
        write_once(be, |out| out.write_float64(-2.0)),
        [0xc0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        write_once(be, |out| out.write_uint64(&[1, 2, 3, 4, 5, 6, 7, 8])),
        [1, 2, 3, 4, 5, 6, 7, 8]
    );
}

#[test]
fn write_primitives_little_endian() {
    let le = Endian::Little;
    assert_eq!(write_once(le, |out| out.write_uint16(0x1234)), [0x34, 0x12]);
    assert_eq!(write_once(le, |out| out.write_int32(-3)), [0xfd, 0xff, 0xff, 0xff]);
    assert_eq!(write_once(le, |out| out.write_float32(1.5)), [0, 0, 0xc0, 0x3f]);
    assert_eq!(
        write_once(le, |out| out.write_int64(&[1, 2, 3, 4, 5, 6, 7, 8])),
        [8, 7, 6, 5, 4, 3, 2, 1]
    );
}

#[test]
fn write_text_and_bytes() {
    let mut out = LinearWriteBuffer::new(Endian::Big, 8);
    out.write_text("ab").unwrap();
    out.write(&[]).unwrap();
    out.write(&[1, 2]).unwrap();
    assert_eq!(out.to_byte_range(), [b'a', b'b', 1, 2]);
}

#[test]
fn write_past_capacity_fails_without_writing() {
    let mut out = LinearWriteBuffer::new(Endian::Big, 3);
    out.write_uint16(0xffff).unwrap();
    assert_eq!(
        out.write_uint16(1),
        Err(BufferError::Bounds { offset: 2, requested: 2, limit: 3 })
    );
    assert_eq!(out.position(), 2);
    assert_eq!(out.len(), 2);
    out.write_uint8(7).unwrap();
    assert_eq!(out.to_byte_range(), [0xff, 0xff, 7]);
}

#[test]
fn backfill_keeps_high_water_length() {
    let mut out = LinearWriteBuffer::new(Endian::Big, 16);
    out.write_uint32(0).unwrap();
    out.write(&[9, 9, 9]).unwrap();

    out.skip_to(0).unwrap();
    out.write_uint32(3).unwrap();
    assert_eq!(out.position(), 4);
    assert_eq!(out.len(), 7);
    assert_eq!(out.to_byte_range(), [0, 0, 0, 3, 9, 9, 9]);

    out.skip(3).unwrap();
    assert!(out.skip(1).is_err());
    assert!(out.skip_to(8).is_err());
}

#[test]
fn clear_reuses_the_allocation() {
    let mut out = LinearWriteBuffer::new(Endian::Big, 4);
    out.write_uint32(1).unwrap();
    out.clear();
    assert!(out.is_empty());
    out.write_uint8(2).unwrap();
    assert_eq!(out.to_byte_range(), [2]);
    assert_eq!(out.capacity(), 4);
}

#[test]
fn truncate_pulls_the_cursor_back() {
    let mut out = LinearWriteBuffer::new(Endian::Big, 8);
    out.write(&[1, 2, 3, 4]).unwrap();
    out.truncate(2).unwrap();
    assert_eq!((out.position(), out.len()), (2, 2));
    assert!(out.truncate(3).is_err());
}

#[test]
fn failed_atomic_write_restores_everything() {
    let mut out = LinearWriteBuffer::new(Endian::Big, 6);
    out.write(&[1, 2, 3, 4]).unwrap();
    out.skip_to(1).unwrap();

    let result: Result<(), BufferError> = crate::write_atomically(&mut out, |out| {
        out.write(&[9, 9, 9, 9])?;
        out.write(&[9, 9])
    });
    assert!(result.is_err());
    assert_eq!(out.to_byte_range(), [1, 2, 3, 4]);
    assert_eq!(out.position(), 1);

    crate::write_atomically(&mut out, |out| out.write_uint8(7)).unwrap();
    assert_eq!(out.to_byte_range(), [1, 7, 3, 4]);
}
