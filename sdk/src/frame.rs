use tidewire_buffer::{write_atomically, Primitive, ReadBuffer, Record, Value, WriteBuffer};
use tidewire_compiler::{record_to_json, CodecError, CompiledContainer, WireError};

use crate::config::BufferConfig;

/// Encodes one `name` message into a fresh write buffer built from `config`
/// and returns the finished bytes.
pub fn encode_to_vec(
    container: &CompiledContainer,
    name: &str,
    record: &Record,
    config: &BufferConfig,
) -> Result<Vec<u8>, CodecError> {
    let mut buffer = config.linear();
    container.encode(name, &mut buffer, record)?;
    Ok(buffer.to_vec())
}

/// Writes `record` preceded by its encoded size in a `prefix` integer.
///
/// The prefix is reserved first and backfilled once the body is written, so
/// the body is encoded only once. Returns the body size. On error the buffer
/// is left as it was before the call.
pub fn encode_length_prefixed(
    container: &CompiledContainer,
    name: &str,
    buffer: &mut dyn WriteBuffer,
    record: &Record,
    prefix: Primitive,
) -> Result<usize, CodecError> {
    let placeholder = prefix
        .count_value(0)
        .ok_or_else(|| CodecError::InvalidTag(prefix.name().to_owned()))?;
    write_atomically(buffer, |buffer| write_frame(container, name, buffer, record, prefix, &placeholder))
}

fn write_frame(
    container: &CompiledContainer,
    name: &str,
    buffer: &mut dyn WriteBuffer,
    record: &Record,
    prefix: Primitive,
    placeholder: &Value,
) -> Result<usize, CodecError> {
    let start = buffer.position();
    prefix
        .write(buffer, placeholder)
        .map_err(|err| CodecError::from_primitive(name, "<frame>", err))?;
    container.encode(name, buffer, record)?;
    let end = buffer.position();

    let size = end - start - prefix.width();
    let value = prefix.count_value(size).ok_or_else(|| CodecError::CountOverflow {
        message: name.to_owned(),
        field:   "<frame>".to_owned(),
        format:  prefix.name().to_owned(),
        count:   size,
    })?;
    buffer.skip_to(start)?;
    prefix
        .write(buffer, &value)
        .map_err(|err| CodecError::from_primitive(name, "<frame>", err))?;
    buffer.skip_to(end)?;
    Ok(size)
}

/// Decodes one `name` message from `bytes` into a pretty-printed JSON string.
pub fn decode_to_json(
    container: &CompiledContainer,
    name: &str,
    bytes: &[u8],
    config: &BufferConfig,
) -> Result<String, WireError> {
    let mut ring = config.with_capacity(config.capacity.max(bytes.len()).max(1)).ring();
    ring.add(bytes)?;
    let record = container.decode(name, &mut ring)?;
    Ok(serde_json::to_string_pretty(&record_to_json(&record))?)
}
