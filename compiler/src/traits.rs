use tidewire_buffer::{read_atomically, write_atomically, ReadBuffer, WriteBuffer};

use crate::error::CodecError;

/// Implemented by the structs [`compile_schema_to_rust`](crate::compile_schema_to_rust)
/// generates. We require `Sized` so that `decode` can return `Self`.
///
/// Generated code supplies the field walks; `encode` and `decode` wrap them
/// so a failure leaves the buffer as it was.
pub trait Message: Sized {
    const NAME: &'static str;
    const DISCRIMINANT: Option<i64> = None;

    fn encode_fields(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError>;
    fn decode_fields(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError>;

    fn encode(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError> {
        write_atomically(buffer, |buffer| self.encode_fields(buffer))
    }

    fn decode(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError> {
        read_atomically(buffer, Self::decode_fields)
    }
}
