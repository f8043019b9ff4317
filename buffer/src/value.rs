use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// A single decoded (or to-be-encoded) datum.
///
/// The 64-bit variants carry the eight bytes most-significant first, exactly
/// as the buffers hand them out; use [`Value::int64`] / [`Value::uint64`] and
/// [`Value::as_integer`] to convert from and to native integers.
#[derive(Clone, PartialEq)]
pub enum Value {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64([u8; 8]),
    UInt64([u8; 8]),
    Float32(f32),
    Float64(f64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn int64(value: i64) -> Value {
        Value::Int64(value.to_be_bytes())
    }

    pub fn uint64(value: u64) -> Value {
        Value::UInt64(value.to_be_bytes())
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match *self {
            Value::Int8(_) => "int8",
            Value::UInt8(_) => "uint8",
            Value::Int16(_) => "int16",
            Value::UInt16(_) => "uint16",
            Value::Int32(_) => "int32",
            Value::UInt32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    /// The value of any integer variant as an `i64`. Returns `None` for
    /// non-integers and for a `UInt64` above `i64::MAX`.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Int8(value) => Some(value as i64),
            Value::UInt8(value) => Some(value as i64),
            Value::Int16(value) => Some(value as i64),
            Value::UInt16(value) => Some(value as i64),
            Value::Int32(value) => Some(value as i64),
            Value::UInt32(value) => Some(value as i64),
            Value::Int64(bytes) => Some(i64::from_be_bytes(bytes)),
            Value::UInt64(bytes) => i64::try_from(u64::from_be_bytes(bytes)).ok(),
            _ => None,
        }
    }

    /// Interprets the value as an element count.
    pub fn as_count(&self) -> Option<usize> {
        match *self {
            Value::UInt64(bytes) => usize::try_from(u64::from_be_bytes(bytes)).ok(),
            _ => self.as_integer().and_then(|value| usize::try_from(value).ok()),
        }
    }

    /// A convenience method to extract a floating-point value. Integers are
    /// not converted.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float32(value) => Some(value as f64),
            Value::Float64(value) => Some(value),
            _ => None,
        }
    }

    /// A convenience method to get the elements out of an [Array](#variant.Array).
    /// Returns an empty slice for other value kinds.
    pub fn as_array(&self) -> &[Value] {
        match *self {
            Value::Array(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match *self {
            Value::Record(ref record) => Some(record),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match *self {
            Value::Bytes(ref bytes) => bytes.as_slice(),
            Value::Text(ref text) => text.as_bytes(),
            _ => &[],
        }
    }

    /// A convenience method to extract the text out of a [Text](#variant.Text).
    /// Returns `""` for other value kinds.
    pub fn as_text(&self) -> &str {
        match *self {
            Value::Text(ref text) => text.as_str(),
            _ => "",
        }
    }

    /// Number of elements of an [Array](#variant.Array), `0` otherwise.
    pub fn len(&self) -> usize {
        match *self {
            Value::Array(ref values) => values.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends to an [Array](#variant.Array). Does nothing for other kinds.
    pub fn push(&mut self, value: Value) {
        if let Value::Array(ref mut values) = *self {
            values.push(value);
        }
    }

    /// A field of a [Record](#variant.Record), `None` for other kinds.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Record(ref record) => record.get(name),
            _ => None,
        }
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// Panics if this value isn't an [Array](#variant.Array) or if the index
    /// is out of bounds.
    fn index(&self, index: usize) -> &Value {
        match *self {
            Value::Array(ref values) => &values[index],
            _ => panic!("cannot index into {}", self.kind()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Int8(value) => value.fmt(f),
            Value::UInt8(value) => value.fmt(f),
            Value::Int16(value) => value.fmt(f),
            Value::UInt16(value) => value.fmt(f),
            Value::Int32(value) => value.fmt(f),
            Value::UInt32(value) => value.fmt(f),
            Value::Int64(bytes) => write!(f, "{}i64", i64::from_be_bytes(bytes)),
            Value::UInt64(bytes) => write!(f, "{}u64", u64::from_be_bytes(bytes)),
            Value::Float32(value) => value.fmt(f),
            Value::Float64(value) => value.fmt(f),
            Value::Bytes(ref bytes) => write!(f, "b{:02x?}", bytes),
            Value::Text(ref text) => text.fmt(f),
            Value::Array(ref values) => values.fmt(f),
            Value::Record(ref record) => record.fmt(f),
        }
    }
}

macro_rules! impl_from {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Value {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    f32 => Float32,
    f64 => Float64,
    Vec<u8> => Bytes,
    String => Text,
    Vec<Value> => Array,
    Record => Record,
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::int64(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Value {
        Value::uint64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Text(value.to_owned())
    }
}

/// One message's worth of attribute values.
///
/// Attribute order is not significant: two records are equal when they hold
/// the same attributes with equal values.
#[derive(Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Record {
        Record::default()
    }

    /// Builder-style [`set`](Record::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Record {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.fields.get(name) {
            Some(value) => value,
            None => panic!("record has no attribute {:?}", name),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Record {
        let mut record = Record::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{{")?;
        let mut first = true;
        for (name, value) in &self.fields {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", name, value)?;
        }
        write!(f, "}}")
    }
}
