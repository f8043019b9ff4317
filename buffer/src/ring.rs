use std::fmt;

use crate::{BufferError, Endian, ReadBuffer};

/// Bytes mirrored past the physical end of a ring: the widest primitive
/// minus one, so any primitive read starting before the end stays contiguous.
pub const GUARD_BAND: usize = 7;

/// A circular byte store over a sliding window of an input stream.
///
/// The window is `[start, start + len)` modulo the capacity. Reads move a
/// cursor inside the window and can be undone with [`reset`]; only
/// [`discard`] commits consumed bytes and makes them unreachable.
///
/// ```
/// use tidewire_buffer::{Endian, ReadBuffer, RingReadBuffer};
///
/// let mut ring = RingReadBuffer::new(Endian::Little, 4);
/// ring.add(&[0xaa, 0xbb, 0xcc]).unwrap();
/// ring.discard(3).unwrap();
///
/// // The next two bytes straddle the physical end of the allocation.
/// ring.add(&[0x34, 0x12]).unwrap();
/// assert_eq!(ring.read_uint16(), Ok(0x1234));
/// ```
///
/// [`reset`]: ReadBuffer::reset
/// [`discard`]: ReadBuffer::discard
pub struct RingReadBuffer {
    data:     Box<[u8]>,
    capacity: usize,
    mask:     Option<usize>,
    start:    usize,
    length:   usize,
    cursor:   usize,
    endian:   Endian,
}

impl RingReadBuffer {
    /// Allocates `capacity + GUARD_BAND` bytes once. A power-of-two capacity
    /// lets offsets wrap with a mask instead of a division.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(endian: Endian, capacity: usize) -> RingReadBuffer {
        assert!(capacity > 0, "ring capacity must be non-zero");

        RingReadBuffer {
            data: vec![0u8; capacity + GUARD_BAND].into_boxed_slice(),
            capacity,
            mask: capacity.is_power_of_two().then(|| capacity - 1),
            start: 0,
            length: 0,
            cursor: 0,
            endian,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Committed bytes in the window, read or not.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// How many more bytes [`add`](ReadBuffer::add) accepts.
    pub fn available(&self) -> usize {
        self.capacity - self.length
    }

    #[inline(always)]
    fn wrap(&self, offset: usize) -> usize {
        match self.mask {
            Some(mask) => offset & mask,
            None => offset % self.capacity,
        }
    }

    /// Physical index of a window-relative offset.
    #[inline(always)]
    fn physical(&self, offset: usize) -> usize {
        self.wrap(self.start + offset)
    }

    #[inline(always)]
    fn ensure(&self, n: usize) -> Result<(), BufferError> {
        if self.length - self.cursor < n {
            return Err(BufferError::Bounds {
                offset:    self.cursor,
                requested: n,
                limit:     self.length,
            });
        }
        Ok(())
    }

    /// Reads `N <= GUARD_BAND + 1` bytes at the cursor as one slice; the
    /// guard band makes this valid even across the physical end.
    #[inline(always)]
    fn take<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.ensure(N)?;
        let at = self.physical(self.cursor);
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[at..at + N]);
        self.cursor += N;
        Ok(bytes)
    }

    fn refresh_guard_band(&mut self) {
        let band = GUARD_BAND.min(self.capacity);
        self.data.copy_within(0..band, self.capacity);
    }
}

impl ReadBuffer for RingReadBuffer {
    fn endian(&self) -> Endian {
        self.endian
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.start = 0;
        self.length = 0;
        self.cursor = 0;
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.ensure(n)?;
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

    fn remaining(&self) -> usize {
        self.length - self.cursor
    }

    fn add(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if data.len() > self.available() {
            return Err(BufferError::CapacityExceeded {
                requested: data.len(),
                available: self.available(),
                capacity:  self.capacity,
            });
        }

        let at = self.physical(self.length);
        let head = data.len().min(self.capacity - at);
        self.data[at..at + head].copy_from_slice(&data[..head]);
        self.data[..data.len() - head].copy_from_slice(&data[head..]);
        self.length += data.len();

        self.refresh_guard_band();
        Ok(())
    }

    fn discard(&mut self, n: usize) -> Result<(), BufferError> {
        if n > self.length {
            return Err(BufferError::Bounds {
                offset:    0,
                requested: n,
                limit:     self.length,
            });
        }
        self.start = self.wrap(self.start + n);
        self.length -= n;
        self.cursor = 0;
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>, BufferError> {
        self.ensure(n)?;
        let at = self.physical(self.cursor);
        let head = n.min(self.capacity - at);

        let mut bytes = Vec::with_capacity(n);
        bytes.extend_from_slice(&self.data[at..at + head]);
        bytes.extend_from_slice(&self.data[..n - head]);
        self.cursor += n;
        Ok(bytes)
    }

    fn read_uint8(&mut self) -> Result<u8, BufferError> {
        self.take::<1>().map(|[byte]| byte)
    }

    fn read_uint16(&mut self) -> Result<u16, BufferError> {
        let bytes = self.take::<2>()?;
        Ok(match self.endian {
            Endian::Big => u16::from_be_bytes(bytes),
            Endian::Little => u16::from_le_bytes(bytes),
        })
    }

    fn read_uint32(&mut self) -> Result<u32, BufferError> {
        let bytes = self.take::<4>()?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes(bytes),
            Endian::Little => u32::from_le_bytes(bytes),
        })
    }

    fn read_uint64(&mut self) -> Result<[u8; 8], BufferError> {
        let mut bytes = self.take::<8>()?;
        if self.endian == Endian::Little {
            bytes.reverse();
        }
        Ok(bytes)
    }
}

impl fmt::Debug for RingReadBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RingReadBuffer")
            .field("capacity", &self.capacity)
            .field("start", &self.start)
            .field("length", &self.length)
            .field("cursor", &self.cursor)
            .field("endian", &self.endian)
            .finish()
    }
}
