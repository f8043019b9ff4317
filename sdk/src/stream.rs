//! Decoding from a stream that arrives in arbitrary chunks.
//!
//! Each helper attempts a whole message from the start of the committed
//! window. When the bytes run out the cursor is rewound and `Ok(None)` is
//! returned, so the caller can [`add`](ReadBuffer::add) more input and poll
//! again. A successful decode commits exactly the bytes it consumed.

use tidewire_buffer::{BufferError, Primitive, ReadBuffer, Record};
use tidewire_compiler::{CodecError, CompiledContainer};
use tracing::trace;

fn settle<T>(buffer: &mut dyn ReadBuffer, result: Result<T, CodecError>) -> Result<Option<T>, CodecError> {
    match result {
        Ok(value) => {
            let consumed = buffer.position();
            buffer.discard(consumed)?;
            trace!(consumed, "committed message");
            Ok(Some(value))
        }
        Err(err) if err.is_incomplete() => {
            buffer.reset();
            trace!(buffered = buffer.remaining(), "waiting for more input");
            Ok(None)
        }
        Err(err) => {
            buffer.reset();
            Err(err)
        }
    }
}

/// Decodes one `name` message if the buffer holds all of it.
pub fn poll_message(
    container: &CompiledContainer,
    name: &str,
    buffer: &mut dyn ReadBuffer,
) -> Result<Option<Record>, CodecError> {
    buffer.reset();
    let result = container.decode(name, buffer);
    settle(buffer, result)
}

/// Decodes one message introduced by a `tag` discriminant, returning the
/// name it dispatched to along with the record.
pub fn poll_tagged(
    container: &CompiledContainer,
    tag: Primitive,
    buffer: &mut dyn ReadBuffer,
) -> Result<Option<(String, Record)>, CodecError> {
    buffer.reset();
    let result = container
        .decode_tagged(tag, buffer)
        .map(|(name, record)| (name.to_owned(), record));
    settle(buffer, result)
}

/// Decodes one `name` message framed by a `prefix` byte count, as written by
/// [`encode_length_prefixed`](crate::encode_length_prefixed).
///
/// Nothing is decoded until the whole frame is buffered, and the body must
/// take up exactly the announced size. A frame larger than the buffer's
/// capacity could never complete and fails with
/// [`BufferError::CapacityExceeded`].
pub fn poll_length_prefixed(
    container: &CompiledContainer,
    name: &str,
    prefix: Primitive,
    buffer: &mut dyn ReadBuffer,
) -> Result<Option<Record>, CodecError> {
    buffer.reset();
    let value = match prefix.read(buffer) {
        Ok(value) => value,
        Err(err) => {
            buffer.reset();
            if err.is_bounds() {
                return Ok(None);
            }
            return Err(err.into());
        }
    };
    let size = match value.as_count() {
        Some(size) => size,
        None => {
            buffer.reset();
            return Err(CodecError::InvalidCount {
                message: name.to_owned(),
                field:   "<frame>".to_owned(),
                found:   format!("{:?}", value),
            });
        }
    };
    let frame = prefix.width().saturating_add(size);
    if frame > buffer.capacity() {
        let buffered = buffer.position() + buffer.remaining();
        buffer.reset();
        return Err(CodecError::Buffer(BufferError::CapacityExceeded {
            requested: frame - buffered,
            available: buffer.capacity() - buffered,
            capacity:  buffer.capacity(),
        }));
    }
    if buffer.remaining() < size {
        buffer.reset();
        trace!(message = name, size, buffered = buffer.remaining(), "frame incomplete");
        return Ok(None);
    }

    let start = buffer.position();
    let result = container.decode(name, buffer).and_then(|record| {
        let actual = buffer.position() - start;
        if actual != size {
            return Err(CodecError::LengthMismatch {
                message:  name.to_owned(),
                field:    "<frame>".to_owned(),
                expected: size,
                actual,
            });
        }
        Ok(record)
    });
    match result {
        Ok(record) => settle(buffer, Ok(record)),
        // The whole frame is buffered, so running out inside it is malformed input.
        Err(err) => {
            buffer.reset();
            Err(err)
        }
    }
}
