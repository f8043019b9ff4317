use thiserror::Error;
use tidewire_buffer::{BufferError, PrimitiveError};

/// Raised once, while compiling a schema, and never during stream processing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Parse error at line {line}, column {column}: {msg}")]
    Parse {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Malformed field token {token:?} in {message}")]
    MalformedField {
        message: String,
        token:   String,
    },

    #[error("The message {0:?} is defined twice")]
    DuplicateMessage(String),

    #[error("The name {0:?} is reserved")]
    ReservedName(String),

    #[error("The attribute {field:?} is declared twice in {message}")]
    DuplicateField {
        message: String,
        field:   String,
    },

    #[error("The format {format:?} of field {field:?} in {message} is not a primitive or an earlier definition")]
    UnresolvedFormat {
        message: String,
        field:   String,
        format:  String,
    },

    #[error("The length {length:?} of field {field:?} in {message} does not resolve")]
    UnresolvedLength {
        message: String,
        field:   String,
        length:  String,
    },

    #[error("The length field {field:?} in {message} is not used by any later sequence")]
    UnusedLengthField {
        message: String,
        field:   String,
    },

    #[error("The format {format:?} cannot carry the element count of {field:?} in {message}")]
    InvalidCountFormat {
        message: String,
        field:   String,
        format:  String,
    },

    #[error("The attribute {key:?} of {message} is invalid: {reason}")]
    InvalidAttribute {
        message: String,
        key:     String,
        reason:  String,
    },

    #[error("The discriminant {value} is declared by both {first:?} and {second:?}")]
    DuplicateDiscriminant {
        value:  i64,
        first:  String,
        second: String,
    },

    #[error("No hook named {0:?} was registered")]
    UnknownHook(String),

    #[error("{message} cannot be compiled by this backend: {reason}")]
    NonPortable {
        message: String,
        reason:  String,
    },
}

/// Raised by compiled procedures at encode/decode time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("No message or format named {0:?}")]
    UnknownMessage(String),

    #[error("No message is registered for discriminant {0}")]
    UnknownDiscriminant(i64),

    #[error("Cannot dispatch on a {0} tag")]
    InvalidTag(String),

    #[error("Missing attribute {field:?} in {message}")]
    MissingField {
        message: String,
        field:   String,
    },

    #[error("Attribute {field:?} of {message}: expected {expected}, found {found}")]
    TypeMismatch {
        message:  String,
        field:    String,
        expected: String,
        found:    String,
    },

    #[error("Attribute {field:?} of {message}: {value} does not fit in {expected}")]
    OutOfRange {
        message:  String,
        field:    String,
        expected: String,
        value:    i64,
    },

    #[error("Sequence {field:?} of {message} has {actual} elements, expected {expected}")]
    LengthMismatch {
        message:  String,
        field:    String,
        expected: usize,
        actual:   usize,
    },

    #[error("The count {count} of {field:?} in {message} does not fit in {format}")]
    CountOverflow {
        message: String,
        field:   String,
        format:  String,
        count:   usize,
    },

    #[error("Invalid element count for {field:?} in {message}: {found}")]
    InvalidCount {
        message: String,
        field:   String,
        found:   String,
    },

    #[error("Hook failed: {0}")]
    Hook(String),
}

impl CodecError {
    /// Attaches the message and attribute a primitive write failed for.
    pub fn from_primitive(message: &str, field: &str, err: PrimitiveError) -> CodecError {
        match err {
            PrimitiveError::Buffer(err) => CodecError::Buffer(err),
            PrimitiveError::Mismatch { expected, found } => CodecError::TypeMismatch {
                message:  message.to_owned(),
                field:    field.to_owned(),
                expected: expected.to_owned(),
                found:    found.to_owned(),
            },
            PrimitiveError::OutOfRange { expected, value } => CodecError::OutOfRange {
                message:  message.to_owned(),
                field:    field.to_owned(),
                expected: expected.to_owned(),
                value,
            },
        }
    }

    /// True when the failure only means the input ran out; the caller can
    /// reset and retry once more bytes arrived.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, CodecError::Buffer(err) if err.is_bounds())
    }
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
