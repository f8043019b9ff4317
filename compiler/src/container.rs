use std::collections::HashMap;
use std::fmt;

use tidewire_buffer::{read_atomically, write_atomically, Primitive, ReadBuffer, Record, Value, WriteBuffer};

use crate::{
    error::CodecError,
    layout::Format,
    program::{Op, Program},
    types::{AttributeValue, Attributes, FieldSpec, MessageSummary, DISCRIMINANT_KEY},
};

/// The output of [`compile`](crate::compile): one encode and one decode
/// procedure per message, plus lookup tables over message attributes.
///
/// A container is immutable after compilation and can be shared between
/// threads; each caller brings its own buffers.
pub struct CompiledContainer {
    program:         Program,
    names:           HashMap<String, Format>,
    discriminants:   HashMap<i64, usize>,
    attribute_index: HashMap<String, HashMap<AttributeValue, usize>>,
}

/// A handle to one compiled message.
#[derive(Clone, Copy)]
pub struct MessageCodec<'a> {
    container: &'a CompiledContainer,
    index:     usize,
}

impl<'a> MessageCodec<'a> {
    pub fn name(&self) -> &'a str {
        &self.container.program.procedures[self.index].name
    }

    pub fn attributes(&self) -> &'a Attributes {
        &self.container.program.procedures[self.index].attributes
    }

    pub fn discriminant(&self) -> Option<i64> {
        self.attributes().get(DISCRIMINANT_KEY).and_then(AttributeValue::as_int)
    }

    pub fn fields(&self) -> &'a [FieldSpec] {
        &self.container.program.procedures[self.index].fields
    }

    /// Encodes at the buffer's current position. On error the buffer's
    /// position, length and bytes are as they were before the call.
    pub fn encode(&self, buffer: &mut dyn WriteBuffer, record: &Record) -> Result<(), CodecError> {
        write_atomically(buffer, |buffer| self.container.program.encode(self.index, buffer, record))
    }

    /// Decodes from the buffer's current position. On error the cursor is
    /// back where it started.
    pub fn decode(&self, buffer: &mut dyn ReadBuffer) -> Result<Record, CodecError> {
        read_atomically(buffer, |buffer| self.container.program.decode(self.index, buffer))
    }
}

impl CompiledContainer {
    pub(crate) fn new(program: Program) -> CompiledContainer {
        let mut names = HashMap::new();
        for (index, format) in program.customs.iter().enumerate() {
            names.insert(format.name.clone(), Format::Custom(index));
        }

        let mut discriminants = HashMap::new();
        let mut attribute_index: HashMap<String, HashMap<AttributeValue, usize>> = HashMap::new();
        for (index, procedure) in program.procedures.iter().enumerate() {
            names.insert(procedure.name.clone(), Format::Message(index));
            for (key, value) in &procedure.attributes {
                if let (DISCRIMINANT_KEY, AttributeValue::Int(discriminant)) = (key.as_str(), value) {
                    discriminants.insert(*discriminant, index);
                }
                // Declaration order: a later message wins a shared value.
                attribute_index.entry(key.clone()).or_default().insert(value.clone(), index);
            }
        }

        CompiledContainer {
            program,
            names,
            discriminants,
            attribute_index,
        }
    }

    /// Number of compiled messages.
    pub fn len(&self) -> usize {
        self.program.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.procedures.is_empty()
    }

    pub fn discriminant_count(&self) -> usize {
        self.discriminants.len()
    }

    /// Message names in declaration order.
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.program.procedures.iter().map(|procedure| procedure.name.as_str())
    }

    pub fn message(&self, name: &str) -> Option<MessageCodec<'_>> {
        match self.names.get(name) {
            Some(&Format::Message(index)) => Some(MessageCodec { container: self, index }),
            _ => None,
        }
    }

    fn expect_message(&self, name: &str) -> Result<MessageCodec<'_>, CodecError> {
        self.message(name).ok_or_else(|| CodecError::UnknownMessage(name.to_owned()))
    }

    fn format(&self, name: &str) -> Result<Format, CodecError> {
        Primitive::from_name(name)
            .map(Format::Primitive)
            .or_else(|| self.names.get(name).copied())
            .ok_or_else(|| CodecError::UnknownMessage(name.to_owned()))
    }

    pub fn encode(&self, name: &str, buffer: &mut dyn WriteBuffer, record: &Record) -> Result<(), CodecError> {
        self.expect_message(name)?.encode(buffer, record)
    }

    pub fn decode(&self, name: &str, buffer: &mut dyn ReadBuffer) -> Result<Record, CodecError> {
        self.expect_message(name)?.decode(buffer)
    }

    /// Encodes a single value with any named format: a message (which needs
    /// a [`Value::Record`]), a custom format or a primitive.
    pub fn encode_value(&self, name: &str, buffer: &mut dyn WriteBuffer, value: &Value) -> Result<(), CodecError> {
        let format = self.format(name)?;
        write_atomically(buffer, |buffer| self.program.encode_format(format, buffer, value, name, ""))
    }

    pub fn decode_value(&self, name: &str, buffer: &mut dyn ReadBuffer) -> Result<Value, CodecError> {
        let format = self.format(name)?;
        read_atomically(buffer, |buffer| self.program.decode_format(format, buffer))
    }

    /// Reads a `tag` primitive and decodes the message registered for its
    /// value. The tag is consumed on success only.
    pub fn decode_tagged(&self, tag: Primitive, buffer: &mut dyn ReadBuffer) -> Result<(&str, Record), CodecError> {
        if !tag.is_integer() {
            return Err(CodecError::InvalidTag(tag.name().to_owned()));
        }
        read_atomically(buffer, |buffer| self.decode_tagged_body(tag, buffer))
    }

    fn decode_tagged_body(&self, tag: Primitive, buffer: &mut dyn ReadBuffer) -> Result<(&str, Record), CodecError> {
        let value = tag.read(buffer)?;
        let discriminant = match value {
            Value::UInt64(bytes) => i64::from_be_bytes(bytes),
            _ => value.as_integer().ok_or_else(|| CodecError::InvalidTag(tag.name().to_owned()))?,
        };
        let index = *self
            .discriminants
            .get(&discriminant)
            .ok_or(CodecError::UnknownDiscriminant(discriminant))?;
        let record = self.program.decode(index, buffer)?;
        Ok((&self.program.procedures[index].name, record))
    }

    /// Writes `record` as the message named `name`, preceded by its
    /// discriminant in a `tag` primitive.
    pub fn encode_tagged(
        &self,
        name: &str,
        tag: Primitive,
        buffer: &mut dyn WriteBuffer,
        record: &Record,
    ) -> Result<(), CodecError> {
        let message = self.expect_message(name)?;
        let discriminant = message
            .discriminant()
            .ok_or_else(|| CodecError::InvalidTag(format!("{} has no discriminant", name)))?;
        if !tag.is_integer() {
            return Err(CodecError::InvalidTag(tag.name().to_owned()));
        }
        let value = match (i32::try_from(discriminant), u32::try_from(discriminant)) {
            (Ok(small), _) => Value::Int32(small),
            (_, Ok(unsigned)) => Value::UInt32(unsigned),
            _ => Value::int64(discriminant),
        };
        write_atomically(buffer, |buffer| {
            tag.write(buffer, &value)
                .map_err(|err| CodecError::from_primitive(name, DISCRIMINANT_KEY, err))?;
            message.encode(buffer, record)
        })
    }

    pub fn lookup_name_by_discriminant(&self, discriminant: i64) -> Option<&str> {
        self.discriminants
            .get(&discriminant)
            .map(|&index| self.program.procedures[index].name.as_str())
    }

    /// The message declaring `key` with `value`. When several messages share
    /// the pair, the one declared last is returned.
    pub fn lookup_name_by_attribute(&self, key: &str, value: &AttributeValue) -> Option<&str> {
        self.attribute_index
            .get(key)
            .and_then(|values| values.get(value))
            .map(|&index| self.program.procedures[index].name.as_str())
    }

    pub fn attributes(&self, name: &str) -> Option<&Attributes> {
        self.message(name).map(|message| message.attributes())
    }

    pub fn discriminant(&self, name: &str) -> Option<i64> {
        self.message(name).and_then(|message| message.discriminant())
    }

    pub fn fields(&self, name: &str) -> Option<&[FieldSpec]> {
        self.message(name).map(|message| message.fields())
    }

    pub fn summary(&self) -> Vec<MessageSummary> {
        self.program
            .procedures
            .iter()
            .map(|procedure| MessageSummary {
                name:       procedure.name.clone(),
                attributes: procedure.attributes.clone(),
                fields:     procedure.fields.clone(),
                hooks:      procedure.ops.iter().filter(|op| matches!(op, Op::Hook(_))).count(),
            })
            .collect()
    }

    pub(crate) fn program(&self) -> &Program {
        &self.program
    }

    pub(crate) fn format_of(&self, name: &str) -> Option<Format> {
        self.format(name).ok()
    }
}

impl fmt::Debug for CompiledContainer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompiledContainer")
            .field("messages", &self.message_names().collect::<Vec<_>>())
            .field("discriminants", &self.discriminants.len())
            .finish()
    }
}
