//! Fixed-capacity byte buffers for tidewire codecs.
//!
//! [`RingReadBuffer`] holds a sliding window of an incoming byte stream and
//! keeps the committed region separate from a speculative read cursor, so a
//! decoder can attempt a whole message, [`reset`](ReadBuffer::reset) when the
//! data runs out and try again once more bytes were [`add`](ReadBuffer::add)ed.
//! [`LinearWriteBuffer`] is the encoding side: a capped contiguous buffer with
//! a write cursor and a high-water length, so length fields can be reserved
//! and backfilled.
//!
//! ```
//! use tidewire_buffer::*;
//!
//! let mut out = LinearWriteBuffer::new(Endian::Big, 16);
//! out.write_uint16(0x0102).unwrap();
//! out.write_int32(-2).unwrap();
//! assert_eq!(out.to_byte_range(), [1, 2, 255, 255, 255, 254]);
//!
//! let mut ring = RingReadBuffer::new(Endian::Big, 8);
//! ring.add(&out.to_byte_range()[..3]).unwrap();
//! assert_eq!(ring.read_uint16(), Ok(0x0102));
//! assert!(ring.read_int32().is_err());
//!
//! // Not enough data yet: rewind, wait for the rest, then commit.
//! ring.reset();
//! ring.add(&out.to_byte_range()[3..]).unwrap();
//! assert_eq!(ring.read_uint16(), Ok(0x0102));
//! assert_eq!(ring.read_int32(), Ok(-2));
//! ring.discard(ring.position()).unwrap();
//! assert_eq!(ring.remaining(), 0);
//! ```

pub mod error;
pub mod linear;
pub mod primitive;
pub mod ring;
pub mod traits;
pub mod value;

pub use error::*;
pub use linear::*;
pub use primitive::*;
pub use ring::*;
pub use traits::*;
pub use value::*;

/// Byte order of the multi-byte primitives a buffer reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    pub fn from_name(name: &str) -> Option<Endian> {
        match name {
            "big" | "be" => Some(Endian::Big),
            "little" | "le" => Some(Endian::Little),
            _ => None,
        }
    }
}
