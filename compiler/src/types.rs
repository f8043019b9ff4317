use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::hooks::{CustomFormat, Hook, HookRef};

/// The attribute key whose integer value registers a message for dispatch.
pub const DISCRIMINANT_KEY: &str = "index";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Text(String),
}

impl AttributeValue {
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            AttributeValue::Int(value) => Some(value),
            AttributeValue::Text(_) => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> AttributeValue {
        AttributeValue::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> AttributeValue {
        AttributeValue::Int(value as i64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> AttributeValue {
        AttributeValue::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> AttributeValue {
        AttributeValue::Text(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttributeValue::Int(value) => value.fmt(f),
            AttributeValue::Text(text) => write!(f, "{:?}", text),
        }
    }
}

pub type Attributes = BTreeMap<String, AttributeValue>;

/// One element of a message layout, in declaration order.
#[derive(Clone, Debug)]
pub enum Entry {
    /// A field token such as `x:int32`, `points:Point[count]` or `:uint8`.
    Field(String),
    /// Declarative metadata; multiple blocks merge, later keys win.
    Attributes(Attributes),
    Hook(HookRef),
    /// A verbatim Rust statement. Only source generation can use it.
    Raw(String),
}

impl Entry {
    pub fn field(token: impl Into<String>) -> Entry {
        Entry::Field(token.into())
    }

    pub fn attributes<K, V, I>(attributes: I) -> Entry
    where
        K: Into<String>,
        V: Into<AttributeValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Entry::Attributes(attributes.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn hook(hook: Hook) -> Entry {
        Entry::Hook(HookRef::Inline(hook))
    }

    pub fn named_hook(name: impl Into<String>) -> Entry {
        Entry::Hook(HookRef::Named(name.into()))
    }

    pub fn raw(statement: impl Into<String>) -> Entry {
        Entry::Raw(statement.into())
    }
}

#[derive(Clone, Debug)]
pub struct MessageDefinition {
    pub name:    String,
    pub line:    usize,
    pub column:  usize,
    pub entries: Vec<Entry>,
}

impl MessageDefinition {
    /// All attribute blocks merged in order.
    pub fn attributes(&self) -> Attributes {
        let mut merged = Attributes::new();
        for entry in &self.entries {
            if let Entry::Attributes(block) = entry {
                merged.extend(block.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        merged
    }
}

#[derive(Clone, Debug)]
pub enum Definition {
    Message(MessageDefinition),
    Custom(CustomFormat),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Message(message) => &message.name,
            Definition::Custom(format) => &format.name,
        }
    }
}

/// An ordered list of definitions. A definition may only refer to formats
/// declared before it.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    pub definitions: Vec<Definition>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    pub fn message(mut self, name: impl Into<String>, entries: impl IntoIterator<Item = Entry>) -> Schema {
        self.definitions.push(Definition::Message(MessageDefinition {
            name:    name.into(),
            line:    0,
            column:  0,
            entries: entries.into_iter().collect(),
        }));
        self
    }

    pub fn custom(mut self, format: CustomFormat) -> Schema {
        self.definitions.push(Definition::Custom(format));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|definition| definition.name() == name)
    }
}

/// A field token split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub attribute: Option<String>,
    pub format:    String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length:    Option<LengthSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthSpec {
    /// `[]`: this field is a length field for a later sequence.
    Declared,
    /// `[name]`: a length field of this message, or a format for an inline count.
    Named(String),
    /// `[3]`
    Fixed(usize),
    /// `[.name]`: the value of an earlier attribute.
    Sibling(String),
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.attribute.as_deref().unwrap_or(""), self.format)?;
        match &self.length {
            None => Ok(()),
            Some(LengthSpec::Declared) => write!(f, "[]"),
            Some(LengthSpec::Named(name)) => write!(f, "[{}]", name),
            Some(LengthSpec::Fixed(count)) => write!(f, "[{}]", count),
            Some(LengthSpec::Sibling(name)) => write!(f, "[.{}]", name),
        }
    }
}

/// What `tw check` prints for each compiled message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
    pub name:       String,
    pub attributes: Attributes,
    pub fields:     Vec<FieldSpec>,
    pub hooks:      usize,
}
