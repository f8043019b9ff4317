//! Conversion between records and `serde_json` values, used by the CLI to
//! read messages to encode and to print decoded ones.

use serde_json::Value as Json;
use tidewire_buffer::{Primitive, Record, Value};

use crate::{
    container::CompiledContainer,
    error::CodecError,
    layout::Format,
    program::{Op, Program},
};

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Int8(v) => Json::from(*v),
        Value::UInt8(v) => Json::from(*v),
        Value::Int16(v) => Json::from(*v),
        Value::UInt16(v) => Json::from(*v),
        Value::Int32(v) => Json::from(*v),
        Value::UInt32(v) => Json::from(*v),
        Value::Int64(bytes) => Json::from(i64::from_be_bytes(*bytes)),
        Value::UInt64(bytes) => Json::from(u64::from_be_bytes(*bytes)),
        Value::Float32(v) => Json::from(*v),
        Value::Float64(v) => Json::from(*v),
        Value::Bytes(bytes) => Json::from(bytes.clone()),
        Value::Text(text) => Json::String(text.clone()),
        Value::Array(values) => Json::Array(values.iter().map(value_to_json).collect()),
        Value::Record(record) => record_to_json(record),
    }
}

pub fn record_to_json(record: &Record) -> Json {
    Json::Object(
        record
            .iter()
            .map(|(name, value)| (name.to_owned(), value_to_json(value)))
            .collect(),
    )
}

impl CompiledContainer {
    /// Builds the record for message `name` out of a JSON object, converting
    /// numbers to the width each field declares. Unknown keys are ignored and
    /// missing ones are left out (encoding reports them).
    pub fn record_from_json(&self, name: &str, json: &Json) -> Result<Record, CodecError> {
        match self.format_of(name) {
            Some(Format::Message(index)) => record_from_json(self.program(), index, json),
            _ => Err(CodecError::UnknownMessage(name.to_owned())),
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn mismatch(message: &str, field: &str, expected: &str, found: &Json) -> CodecError {
    CodecError::TypeMismatch {
        message:  message.to_owned(),
        field:    field.to_owned(),
        expected: expected.to_owned(),
        found:    json_kind(found).to_owned(),
    }
}

fn record_from_json(program: &Program, index: usize, json: &Json) -> Result<Record, CodecError> {
    let procedure = &program.procedures[index];
    let message = procedure.name.as_str();
    let object = json.as_object().ok_or_else(|| mismatch(message, "", "object", json))?;

    let mut record = Record::new();
    for op in &procedure.ops {
        let Op::Field { attribute, format, count } = op else {
            continue;
        };
        let Some(item) = object.get(attribute) else {
            continue;
        };
        let value = match count {
            None => value_from_json(program, *format, item, message, attribute)?,
            Some(_) => {
                let items = item.as_array().ok_or_else(|| mismatch(message, attribute, "array", item))?;
                Value::Array(
                    items
                        .iter()
                        .map(|item| value_from_json(program, *format, item, message, attribute))
                        .collect::<Result<_, _>>()?,
                )
            }
        };
        record.set(attribute.clone(), value);
    }
    Ok(record)
}

fn value_from_json(program: &Program, format: Format, json: &Json, message: &str, field: &str) -> Result<Value, CodecError> {
    match format {
        Format::Primitive(primitive) => {
            primitive_from_json(primitive, json).ok_or_else(|| mismatch(message, field, primitive.name(), json))
        }
        Format::Message(index) => Ok(Value::Record(record_from_json(program, index, json)?)),
        Format::Custom(_) => Ok(untyped_from_json(json)),
    }
}

fn primitive_from_json(primitive: Primitive, json: &Json) -> Option<Value> {
    Some(match primitive {
        Primitive::Int8 => Value::Int8(i8::try_from(json.as_i64()?).ok()?),
        Primitive::UInt8 => Value::UInt8(u8::try_from(json.as_i64()?).ok()?),
        Primitive::Int16 => Value::Int16(i16::try_from(json.as_i64()?).ok()?),
        Primitive::UInt16 => Value::UInt16(u16::try_from(json.as_i64()?).ok()?),
        Primitive::Int32 => Value::Int32(i32::try_from(json.as_i64()?).ok()?),
        Primitive::UInt32 => Value::UInt32(u32::try_from(json.as_i64()?).ok()?),
        Primitive::Int64 => Value::int64(json.as_i64()?),
        Primitive::UInt64 => Value::uint64(json.as_u64()?),
        Primitive::Float32 => Value::Float32(json.as_f64()? as f32),
        Primitive::Float64 => Value::Float64(json.as_f64()?),
    })
}

/// Custom formats declare no shape, so their JSON is mapped structurally.
fn untyped_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Bytes(Vec::new()),
        Json::Bool(flag) => Value::UInt8(*flag as u8),
        Json::Number(number) => {
            if let Some(integer) = number.as_i64() {
                match i32::try_from(integer) {
                    Ok(small) => Value::Int32(small),
                    Err(_) => Value::int64(integer),
                }
            } else if let Some(unsigned) = number.as_u64() {
                Value::uint64(unsigned)
            } else {
                Value::Float64(number.as_f64().unwrap_or_default())
            }
        }
        Json::String(text) => Value::Text(text.clone()),
        Json::Array(items) => Value::Array(items.iter().map(untyped_from_json).collect()),
        Json::Object(fields) => Value::Record(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), untyped_from_json(value)))
                .collect(),
        ),
    }
}
