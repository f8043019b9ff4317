//! The interpreted backend: each message compiles to a flat list of ops that
//! walk a record and a buffer in declaration order.

use std::borrow::Cow;

use tidewire_buffer::{ReadBuffer, Record, Value, WriteBuffer};

use crate::{
    error::CodecError,
    hooks::{CustomFormat, Hook},
    layout::{CountSource, Format},
    support::check_len,
    types::{Attributes, FieldSpec},
};

#[derive(Debug)]
pub(crate) enum Op {
    Field {
        attribute: String,
        format:    Format,
        count:     Option<CountSource>,
    },
    /// Carries the element count of `sequences`; it has no attribute of its
    /// own in the record.
    LengthField {
        attribute: String,
        format:    Format,
        slot:      usize,
        sequences: Vec<String>,
    },
    Hook(Hook),
}

#[derive(Debug)]
pub(crate) struct Procedure {
    pub name:       String,
    pub attributes: Attributes,
    pub ops:        Vec<Op>,
    pub slots:      usize,
    pub fields:     Vec<FieldSpec>,
}

#[derive(Debug, Default)]
pub(crate) struct Program {
    pub procedures: Vec<Procedure>,
    pub customs:    Vec<CustomFormat>,
}

fn missing(message: &str, field: &str) -> CodecError {
    CodecError::MissingField {
        message: message.to_owned(),
        field:   field.to_owned(),
    }
}

fn mismatch(message: &str, field: &str, expected: &str, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        message:  message.to_owned(),
        field:    field.to_owned(),
        expected: expected.to_owned(),
        found:    found.kind().to_owned(),
    }
}

impl Program {
    pub fn format_name(&self, format: Format) -> &str {
        match format {
            Format::Primitive(primitive) => primitive.name(),
            Format::Message(index) => &self.procedures[index].name,
            Format::Custom(index) => &self.customs[index].name,
        }
    }

    pub fn encode(&self, index: usize, buffer: &mut dyn WriteBuffer, record: &Record) -> Result<(), CodecError> {
        let procedure = &self.procedures[index];
        let message = procedure.name.as_str();
        // Copied on the first encode hook, which may write to it.
        let mut record = Cow::Borrowed(record);

        for op in &procedure.ops {
            match op {
                Op::Field { attribute, format, count } => {
                    let value = record.get(attribute).ok_or_else(|| missing(message, attribute))?;
                    let Some(count) = count else {
                        self.encode_format(*format, buffer, value, message, attribute)?;
                        continue;
                    };

                    let elements = match value {
                        Value::Array(elements) => elements,
                        other => return Err(mismatch(message, attribute, "array", other)),
                    };
                    match count {
                        CountSource::Inline(prefix) => {
                            self.encode_count(*prefix, buffer, elements.len(), message, attribute)?
                        }
                        CountSource::Fixed(expected) => check_len(message, attribute, *expected, elements.len())?,
                        CountSource::Sibling(name) => {
                            let expected = self.sibling_count(&record, message, name)?;
                            check_len(message, attribute, expected, elements.len())?
                        }
                        CountSource::Slot(_) => {}
                    }
                    for element in elements {
                        self.encode_format(*format, buffer, element, message, attribute)?;
                    }
                }
                Op::LengthField { attribute, format, sequences, .. } => {
                    let mut count = None;
                    for sequence in sequences {
                        let len = match record.get(sequence) {
                            Some(Value::Array(elements)) => elements.len(),
                            Some(other) => return Err(mismatch(message, sequence, "array", other)),
                            None => return Err(missing(message, sequence)),
                        };
                        match count {
                            None => count = Some(len),
                            Some(expected) => check_len(message, sequence, expected, len)?,
                        }
                    }
                    self.encode_count(*format, buffer, count.unwrap_or(0), message, attribute)?;
                }
                Op::Hook(hook) => {
                    if let Some(encode) = &hook.encode {
                        encode(buffer, record.to_mut())?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn decode(&self, index: usize, buffer: &mut dyn ReadBuffer) -> Result<Record, CodecError> {
        let procedure = &self.procedures[index];
        let message = procedure.name.as_str();
        let mut record = Record::new();
        let mut slots = vec![0usize; procedure.slots];

        for op in &procedure.ops {
            match op {
                Op::Field { attribute, format, count: None } => {
                    let value = self.decode_format(*format, buffer)?;
                    record.set(attribute.clone(), value);
                }
                Op::Field { attribute, format, count: Some(count) } => {
                    let count = match count {
                        CountSource::Inline(prefix) => self.decode_count(*prefix, buffer, message, attribute)?,
                        CountSource::Fixed(count) => *count,
                        CountSource::Sibling(name) => self.sibling_count(&record, message, name)?,
                        CountSource::Slot(slot) => slots[*slot],
                    };
                    // A corrupt count must not reserve more than the input can hold.
                    let mut elements = Vec::with_capacity(count.min(buffer.remaining()));
                    for _ in 0..count {
                        elements.push(self.decode_format(*format, buffer)?);
                    }
                    record.set(attribute.clone(), Value::Array(elements));
                }
                Op::LengthField { attribute, format, slot, .. } => {
                    slots[*slot] = self.decode_count(*format, buffer, message, attribute)?;
                }
                Op::Hook(hook) => {
                    if let Some(decode) = &hook.decode {
                        decode(buffer, &mut record)?;
                    }
                }
            }
        }
        Ok(record)
    }

    pub fn encode_format(
        &self,
        format: Format,
        buffer: &mut dyn WriteBuffer,
        value: &Value,
        message: &str,
        field: &str,
    ) -> Result<(), CodecError> {
        match format {
            Format::Primitive(primitive) => primitive
                .write(buffer, value)
                .map_err(|err| CodecError::from_primitive(message, field, err)),
            Format::Message(index) => match value {
                Value::Record(record) => self.encode(index, buffer, record),
                other => Err(mismatch(message, field, &self.procedures[index].name, other)),
            },
            Format::Custom(index) => (self.customs[index].encode)(buffer, value),
        }
    }

    pub fn decode_format(&self, format: Format, buffer: &mut dyn ReadBuffer) -> Result<Value, CodecError> {
        match format {
            Format::Primitive(primitive) => Ok(primitive.read(buffer)?),
            Format::Message(index) => Ok(Value::Record(self.decode(index, buffer)?)),
            Format::Custom(index) => (self.customs[index].decode)(buffer),
        }
    }

    fn encode_count(
        &self,
        format: Format,
        buffer: &mut dyn WriteBuffer,
        count: usize,
        message: &str,
        field: &str,
    ) -> Result<(), CodecError> {
        let overflow = || CodecError::CountOverflow {
            message: message.to_owned(),
            field: field.to_owned(),
            format: self.format_name(format).to_owned(),
            count,
        };
        let value = match format {
            Format::Primitive(primitive) => primitive.count_value(count).ok_or_else(overflow)?,
            _ => Value::UInt32(u32::try_from(count).map_err(|_| overflow())?),
        };
        self.encode_format(format, buffer, &value, message, field)
    }

    fn decode_count(
        &self,
        format: Format,
        buffer: &mut dyn ReadBuffer,
        message: &str,
        field: &str,
    ) -> Result<usize, CodecError> {
        let value = self.decode_format(format, buffer)?;
        value.as_count().ok_or_else(|| CodecError::InvalidCount {
            message: message.to_owned(),
            field:   field.to_owned(),
            found:   format!("{:?}", value),
        })
    }

    fn sibling_count(&self, record: &Record, message: &str, name: &str) -> Result<usize, CodecError> {
        let value = record.get(name).ok_or_else(|| missing(message, name))?;
        value.as_count().ok_or_else(|| CodecError::InvalidCount {
            message: message.to_owned(),
            field:   name.to_owned(),
            found:   format!("{:?}", value),
        })
    }
}
