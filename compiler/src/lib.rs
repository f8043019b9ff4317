//! tidewire-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.tw` layout files, plus a builder API
//!     ([`Schema`], [`Entry`]) for schemas assembled in code,
//!  2) Schema checks (duplicate or reserved names, discriminant collisions,
//!     unresolved formats and lengths),
//!  3) [`compile`], which turns a schema into a [`CompiledContainer`] of
//!     interpreted encode/decode procedures with a discriminant registry,
//!  4) Rust source generation ([`compile_schema_to_rust`]) for the same layouts,
//!  5) Error types ([`SchemaError`], [`CodecError`], [`WireError`]) and the
//!     [`Message`] trait implemented by generated code.
//!
//! ```
//! use tidewire_buffer::{Endian, LinearWriteBuffer, ReadBuffer, Record, RingReadBuffer, WriteBuffer};
//! use tidewire_compiler::{compile_source, Extensions};
//!
//! let container = compile_source("Point = [x:int16, y:int16];", &Extensions::new()).unwrap();
//! let point = Record::new().with("x", 1i16).with("y", -1i16);
//!
//! let mut out = LinearWriteBuffer::new(Endian::Big, 16);
//! container.encode("Point", &mut out, &point).unwrap();
//! assert_eq!(out.to_byte_range(), [0, 1, 0xff, 0xff]);
//!
//! let mut ring = RingReadBuffer::new(Endian::Big, 16);
//! ring.add(out.to_byte_range()).unwrap();
//! assert_eq!(container.decode("Point", &mut ring).unwrap(), point);
//! ```

pub mod compiler;
pub mod container;
pub mod error;
pub mod field;
pub mod gen_rust;
pub mod hooks;
pub mod json;
pub mod parser;
pub mod support;
pub mod tokenizer;
pub mod traits;
pub mod types;
pub mod utils;
pub mod verifier;

mod layout;
mod program;

pub use compiler::{compile, compile_source, parse_source};
pub use container::{CompiledContainer, MessageCodec};
pub use error::{CodecError, SchemaError, WireError};
pub use gen_rust::compile_schema_to_rust;
pub use hooks::{CustomFormat, Extensions, Hook, HookRef};
pub use json::{record_to_json, value_to_json};
pub use traits::Message;
pub use types::{AttributeValue, Attributes, Definition, Entry, FieldSpec, LengthSpec, MessageDefinition, Schema, DISCRIMINANT_KEY};
