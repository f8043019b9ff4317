use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A read, skip, write or discard reached past the bytes it may touch.
    /// On the read side this means "not enough data yet".
    #[error("index out of range: {requested} bytes from offset {offset} exceeds limit {limit}")]
    Bounds {
        offset:    usize,
        requested: usize,
        limit:     usize,
    },

    #[error("buffer overflow: cannot add {requested} bytes, {available} of {capacity} free")]
    CapacityExceeded {
        requested: usize,
        available: usize,
        capacity:  usize,
    },
}

impl BufferError {
    pub fn is_bounds(&self) -> bool {
        matches!(self, BufferError::Bounds { .. })
    }
}

/// Failure to write a [`Value`](crate::Value) through a
/// [`Primitive`](crate::Primitive).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrimitiveError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("cannot write {found} as {expected}")]
    Mismatch {
        expected: &'static str,
        found:    &'static str,
    },

    #[error("value {value} does not fit in {expected}")]
    OutOfRange {
        expected: &'static str,
        value:    i64,
    },
}
