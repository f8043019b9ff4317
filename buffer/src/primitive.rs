use std::fmt;

use crate::{BufferError, PrimitiveError, ReadBuffer, Value, WriteBuffer};

/// The fixed-width wire primitives every buffer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

pub const PRIMITIVES: [Primitive; 10] = [
    Primitive::Int8,
    Primitive::UInt8,
    Primitive::Int16,
    Primitive::UInt16,
    Primitive::Int32,
    Primitive::UInt32,
    Primitive::Int64,
    Primitive::UInt64,
    Primitive::Float32,
    Primitive::Float64,
];

impl Primitive {
    /// Resolves a schema format name. `float` and `double` are accepted as
    /// aliases of `float32` and `float64`.
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "int8" => Some(Primitive::Int8),
            "uint8" => Some(Primitive::UInt8),
            "int16" => Some(Primitive::Int16),
            "uint16" => Some(Primitive::UInt16),
            "int32" => Some(Primitive::Int32),
            "uint32" => Some(Primitive::UInt32),
            "int64" => Some(Primitive::Int64),
            "uint64" => Some(Primitive::UInt64),
            "float32" | "float" => Some(Primitive::Float32),
            "float64" | "double" => Some(Primitive::Float64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int8 => "int8",
            Primitive::UInt8 => "uint8",
            Primitive::Int16 => "int16",
            Primitive::UInt16 => "uint16",
            Primitive::Int32 => "int32",
            Primitive::UInt32 => "uint32",
            Primitive::Int64 => "int64",
            Primitive::UInt64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
        }
    }

    /// Encoded size in bytes.
    pub fn width(self) -> usize {
        match self {
            Primitive::Int8 | Primitive::UInt8 => 1,
            Primitive::Int16 | Primitive::UInt16 => 2,
            Primitive::Int32 | Primitive::UInt32 | Primitive::Float32 => 4,
            Primitive::Int64 | Primitive::UInt64 | Primitive::Float64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    pub fn read(self, buffer: &mut dyn ReadBuffer) -> Result<Value, BufferError> {
        Ok(match self {
            Primitive::Int8 => Value::Int8(buffer.read_int8()?),
            Primitive::UInt8 => Value::UInt8(buffer.read_uint8()?),
            Primitive::Int16 => Value::Int16(buffer.read_int16()?),
            Primitive::UInt16 => Value::UInt16(buffer.read_uint16()?),
            Primitive::Int32 => Value::Int32(buffer.read_int32()?),
            Primitive::UInt32 => Value::UInt32(buffer.read_uint32()?),
            Primitive::Int64 => Value::Int64(buffer.read_int64()?),
            Primitive::UInt64 => Value::UInt64(buffer.read_uint64()?),
            Primitive::Float32 => Value::Float32(buffer.read_float32()?),
            Primitive::Float64 => Value::Float64(buffer.read_float64()?),
        })
    }

    /// Writes `value` with this primitive's width. Any integer variant is
    /// accepted for an integer primitive as long as it fits; `float64` also
    /// accepts a `Float32`.
    pub fn write(self, buffer: &mut dyn WriteBuffer, value: &Value) -> Result<(), PrimitiveError> {
        match self {
            Primitive::Int8 => buffer.write_int8(self.narrow(value)?)?,
            Primitive::UInt8 => buffer.write_uint8(self.narrow(value)?)?,
            Primitive::Int16 => buffer.write_int16(self.narrow(value)?)?,
            Primitive::UInt16 => buffer.write_uint16(self.narrow(value)?)?,
            Primitive::Int32 => buffer.write_int32(self.narrow(value)?)?,
            Primitive::UInt32 => buffer.write_uint32(self.narrow(value)?)?,
            Primitive::Int64 => buffer.write_int64(&self.wide(value)?)?,
            Primitive::UInt64 => buffer.write_uint64(&self.wide(value)?)?,
            Primitive::Float32 => match *value {
                Value::Float32(float) => buffer.write_float32(float)?,
                _ => return Err(self.mismatch(value)),
            },
            Primitive::Float64 => match *value {
                Value::Float64(float) => buffer.write_float64(float)?,
                Value::Float32(float) => buffer.write_float64(float as f64)?,
                _ => return Err(self.mismatch(value)),
            },
        }
        Ok(())
    }

    /// Builds the value this primitive writes for an element count, or
    /// `None` if the count does not fit (or the primitive is a float).
    pub fn count_value(self, count: usize) -> Option<Value> {
        let count = count as u64;
        Some(match self {
            Primitive::Int8 => Value::Int8(i8::try_from(count).ok()?),
            Primitive::UInt8 => Value::UInt8(u8::try_from(count).ok()?),
            Primitive::Int16 => Value::Int16(i16::try_from(count).ok()?),
            Primitive::UInt16 => Value::UInt16(u16::try_from(count).ok()?),
            Primitive::Int32 => Value::Int32(i32::try_from(count).ok()?),
            Primitive::UInt32 => Value::UInt32(u32::try_from(count).ok()?),
            Primitive::Int64 => Value::int64(i64::try_from(count).ok()?),
            Primitive::UInt64 => Value::uint64(count),
            Primitive::Float32 | Primitive::Float64 => return None,
        })
    }

    fn mismatch(self, value: &Value) -> PrimitiveError {
        PrimitiveError::Mismatch {
            expected: self.name(),
            found:    value.kind(),
        }
    }

    fn narrow<T: TryFrom<i64>>(self, value: &Value) -> Result<T, PrimitiveError> {
        let integer = match *value {
            Value::Int64(_) | Value::UInt64(_) => None,
            _ => value.as_integer(),
        };
        let integer = integer.ok_or_else(|| self.mismatch(value))?;
        T::try_from(integer).map_err(|_| PrimitiveError::OutOfRange {
            expected: self.name(),
            value:    integer,
        })
    }

    fn wide(self, value: &Value) -> Result<[u8; 8], PrimitiveError> {
        match *value {
            Value::Int64(bytes) | Value::UInt64(bytes) => Ok(bytes),
            _ => {
                let integer = value.as_integer().ok_or_else(|| self.mismatch(value))?;
                if self == Primitive::UInt64 && integer < 0 {
                    return Err(PrimitiveError::OutOfRange {
                        expected: self.name(),
                        value:    integer,
                    });
                }
                Ok(integer.to_be_bytes())
            }
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
