use crate::{BufferError, Endian};

/// The read side of the buffer contract that compiled decode procedures
/// consume. Every method that moves the cursor either succeeds completely or
/// leaves the buffer untouched.
///
/// The 64-bit readers return the eight bytes most-significant first whatever
/// the wire order is; no numeric widening happens here.
pub trait ReadBuffer {
    fn endian(&self) -> Endian;

    /// The most bytes the committed window can ever hold.
    fn capacity(&self) -> usize;

    /// Drops every committed byte and rewinds the cursor.
    fn clear(&mut self);

    /// Rewinds the cursor to the start of the committed window.
    fn reset(&mut self);

    fn skip(&mut self, n: usize) -> Result<(), BufferError>;

    fn skip_to(&mut self, pos: usize) -> Result<(), BufferError>;

    /// Cursor offset from the start of the committed window.
    fn position(&self) -> usize;

    /// Committed bytes ahead of the cursor.
    fn remaining(&self) -> usize;

    /// Appends newly received bytes past the committed tail.
    fn add(&mut self, data: &[u8]) -> Result<(), BufferError>;

    /// Commits `n` consumed bytes: they become unreachable and the cursor
    /// returns to the new window start.
    fn discard(&mut self, n: usize) -> Result<(), BufferError>;

    fn read(&mut self, n: usize) -> Result<Vec<u8>, BufferError>;

    fn read_uint8(&mut self) -> Result<u8, BufferError>;
    fn read_uint16(&mut self) -> Result<u16, BufferError>;
    fn read_uint32(&mut self) -> Result<u32, BufferError>;
    fn read_uint64(&mut self) -> Result<[u8; 8], BufferError>;

    fn read_int8(&mut self) -> Result<i8, BufferError> {
        self.read_uint8().map(|value| value as i8)
    }

    fn read_int16(&mut self) -> Result<i16, BufferError> {
        self.read_uint16().map(|value| value as i16)
    }

    fn read_int32(&mut self) -> Result<i32, BufferError> {
        self.read_uint32().map(|value| value as i32)
    }

    fn read_int64(&mut self) -> Result<[u8; 8], BufferError> {
        self.read_uint64()
    }

    fn read_float32(&mut self) -> Result<f32, BufferError> {
        self.read_uint32().map(f32::from_bits)
    }

    fn read_float64(&mut self) -> Result<f64, BufferError> {
        self.read_uint64()
            .map(|bytes| f64::from_bits(u64::from_be_bytes(bytes)))
    }
}

/// The write side of the buffer contract that compiled encode procedures
/// produce into.
pub trait WriteBuffer {
    fn endian(&self) -> Endian;

    /// Rewinds the cursor and forgets everything written.
    fn clear(&mut self);

    /// Moves the cursor forward over already written bytes.
    fn skip(&mut self, n: usize) -> Result<(), BufferError>;

    /// Moves the cursor to `pos`, which may not lie past the high-water length.
    fn skip_to(&mut self, pos: usize) -> Result<(), BufferError>;

    fn position(&self) -> usize;

    /// High-water length: the size of the finished output.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes `[0, len())`, regardless of where the cursor currently is.
    fn to_byte_range(&self) -> &[u8];

    /// Forgets everything from `len` on, pulling the cursor back if it lay
    /// past the new end.
    fn truncate(&mut self, len: usize) -> Result<(), BufferError>;

    fn write(&mut self, data: &[u8]) -> Result<(), BufferError>;

    fn write_text(&mut self, text: &str) -> Result<(), BufferError> {
        self.write(text.as_bytes())
    }

    fn write_uint8(&mut self, value: u8) -> Result<(), BufferError>;
    fn write_uint16(&mut self, value: u16) -> Result<(), BufferError>;
    fn write_uint32(&mut self, value: u32) -> Result<(), BufferError>;

    /// Takes the value most-significant byte first.
    fn write_uint64(&mut self, value: &[u8; 8]) -> Result<(), BufferError>;

    fn write_int8(&mut self, value: i8) -> Result<(), BufferError> {
        self.write_uint8(value as u8)
    }

    fn write_int16(&mut self, value: i16) -> Result<(), BufferError> {
        self.write_uint16(value as u16)
    }

    fn write_int32(&mut self, value: i32) -> Result<(), BufferError> {
        self.write_uint32(value as u32)
    }

    fn write_int64(&mut self, value: &[u8; 8]) -> Result<(), BufferError> {
        self.write_uint64(value)
    }

    fn write_float32(&mut self, value: f32) -> Result<(), BufferError> {
        self.write_uint32(value.to_bits())
    }

    fn write_float64(&mut self, value: f64) -> Result<(), BufferError> {
        self.write_uint64(&value.to_bits().to_be_bytes())
    }
}

/// Runs `read` and moves the cursor back to where it started if `read` fails,
/// so a failed decode leaves nothing behind.
pub fn read_atomically<T, E>(
    buffer: &mut dyn ReadBuffer,
    read: impl FnOnce(&mut dyn ReadBuffer) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<BufferError>,
{
    let position = buffer.position();
    let result = read(&mut *buffer);
    if result.is_err() {
        buffer.skip_to(position)?;
    }
    result
}

/// Runs `write` and, if it fails, restores the cursor, the length and any
/// bytes it overwrote.
pub fn write_atomically<T, E>(
    buffer: &mut dyn WriteBuffer,
    write: impl FnOnce(&mut dyn WriteBuffer) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<BufferError>,
{
    let position = buffer.position();
    let overwritten = buffer.to_byte_range()[position..].to_vec();
    let result = write(&mut *buffer);
    if result.is_err() {
        buffer.truncate(position)?;
        buffer.write(&overwritten)?;
        buffer.skip_to(position)?;
    }
    result
}
