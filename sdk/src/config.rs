use tidewire_buffer::{Endian, LinearWriteBuffer, RingReadBuffer};

/// Capacity used when nothing else is configured: 128 KiB.
pub const DEFAULT_CAPACITY: usize = 1 << 17;

/// Byte order and capacity shared by the read and write buffers of one
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    pub endian:   Endian,
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            endian:   Endian::Big,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl BufferConfig {
    pub fn new(endian: Endian, capacity: usize) -> BufferConfig {
        BufferConfig { endian, capacity }
    }

    pub fn with_endian(self, endian: Endian) -> BufferConfig {
        BufferConfig { endian, ..self }
    }

    pub fn with_capacity(self, capacity: usize) -> BufferConfig {
        BufferConfig { capacity, ..self }
    }

    pub fn ring(&self) -> RingReadBuffer {
        RingReadBuffer::new(self.endian, self.capacity)
    }

    pub fn linear(&self) -> LinearWriteBuffer {
        LinearWriteBuffer::new(self.endian, self.capacity)
    }
}

#[test]
fn test_buffer_config() {
    let config = BufferConfig::default();
    assert_eq!(config.endian, Endian::Big);
    assert_eq!(config.ring().capacity(), DEFAULT_CAPACITY);

    let config = config.with_endian(Endian::Little).with_capacity(64);
    assert_eq!(config, BufferConfig::new(Endian::Little, 64));
    assert_eq!(config.linear().capacity(), 64);
}
