//! tidewire
//!
//! The facade crate: everything an application or generated code needs, in
//! one place.
//!
//! - Buffers and values (re-exported from `tidewire-buffer`)
//! - The schema compiler and [`CompiledContainer`] (re-exported from
//!   `tidewire-compiler`)
//! - [`BufferConfig`] for building matching read and write buffers
//! - Stream helpers ([`poll_message`], [`poll_tagged`], [`poll_length_prefixed`])
//!   that decode from a ring buffer as bytes trickle in
//! - Framing helpers ([`encode_to_vec`], [`encode_length_prefixed`])
//!
//! ```
//! use tidewire::*;
//!
//! let container = compile_source(
//!     "Ping = [.attributes{index: 1}, seq:uint32];",
//!     &Extensions::new(),
//! )?;
//! let config = BufferConfig::default();
//! let bytes = encode_to_vec(&container, "Ping", &Record::new().with("seq", 9u32), &config)?;
//!
//! let mut ring = config.ring();
//! ring.add(&bytes[..2])?;
//! assert_eq!(poll_message(&container, "Ping", &mut ring)?, None);
//! ring.add(&bytes[2..])?;
//! assert_eq!(
//!     poll_message(&container, "Ping", &mut ring)?,
//!     Some(Record::new().with("seq", 9u32))
//! );
//! # Ok::<(), WireError>(())
//! ```

pub mod config;
pub mod frame;
pub mod stream;

pub use config::{BufferConfig, DEFAULT_CAPACITY};
pub use frame::{decode_to_json, encode_length_prefixed, encode_to_vec};
pub use stream::{poll_length_prefixed, poll_message, poll_tagged};

pub use tidewire_buffer::{
    read_atomically, write_atomically, BufferError, Endian, LinearWriteBuffer, Primitive, PrimitiveError, ReadBuffer,
    Record, RingReadBuffer, Value, WriteBuffer, GUARD_BAND,
};
pub use tidewire_compiler::{
    compile, compile_schema_to_rust, compile_source, parse_source, record_to_json, value_to_json, AttributeValue,
    Attributes, CodecError, CompiledContainer, CustomFormat, Entry, Extensions, FieldSpec, Hook, HookRef, Message,
    MessageCodec, Schema, SchemaError, WireError, DISCRIMINANT_KEY,
};

/// Helpers called by generated code.
pub mod support {
    pub use tidewire_compiler::support::*;
}

pub mod error {
    pub use tidewire_buffer::{BufferError, PrimitiveError};
    pub use tidewire_compiler::error::{CodecError, SchemaError, WireError};
}
