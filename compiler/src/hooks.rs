use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tidewire_buffer::{ReadBuffer, Record, Value, WriteBuffer};

use crate::error::CodecError;

pub type EncodeHookFn = Arc<dyn Fn(&mut dyn WriteBuffer, &mut Record) -> Result<(), CodecError> + Send + Sync>;
pub type DecodeHookFn = Arc<dyn Fn(&mut dyn ReadBuffer, &mut Record) -> Result<(), CodecError> + Send + Sync>;

/// User code spliced into a message's procedures at a fixed position.
///
/// The encode side gets a working copy of the record being encoded and may
/// set derived attributes that later fields encode; the caller's record is
/// left untouched. The decode side sees the record built so far and may add
/// or rewrite attributes. Either side may be absent, in which case that
/// direction does nothing at this position.
#[derive(Clone, Default)]
pub struct Hook {
    pub encode: Option<EncodeHookFn>,
    pub decode: Option<DecodeHookFn>,
}

impl Hook {
    pub fn on_encode<F>(encode: F) -> Hook
    where
        F: Fn(&mut dyn WriteBuffer, &mut Record) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        Hook { encode: Some(Arc::new(encode)), decode: None }
    }

    pub fn on_decode<F>(decode: F) -> Hook
    where
        F: Fn(&mut dyn ReadBuffer, &mut Record) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        Hook { encode: None, decode: Some(Arc::new(decode)) }
    }

    /// Adds (or replaces) the decode side.
    pub fn and_decode<F>(mut self, decode: F) -> Hook
    where
        F: Fn(&mut dyn ReadBuffer, &mut Record) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(decode));
        self
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Hook")
            .field("encode", &self.encode.is_some())
            .field("decode", &self.decode.is_some())
            .finish()
    }
}

/// A hook entry in a message layout: either the procedure itself or the name
/// it is registered under in [`Extensions`].
#[derive(Clone, Debug)]
pub enum HookRef {
    Inline(Hook),
    Named(String),
}

pub type CustomEncodeFn = Arc<dyn Fn(&mut dyn WriteBuffer, &Value) -> Result<(), CodecError> + Send + Sync>;
pub type CustomDecodeFn = Arc<dyn Fn(&mut dyn ReadBuffer) -> Result<Value, CodecError> + Send + Sync>;

/// A named format implemented by user code. Fields, sequence elements and
/// inline counts may all use it like a primitive. When used as a count it is
/// handed a `UInt32` and must decode to something with an element count.
#[derive(Clone)]
pub struct CustomFormat {
    pub name:   String,
    pub encode: CustomEncodeFn,
    pub decode: CustomDecodeFn,
}

impl CustomFormat {
    pub fn new<E, D>(name: impl Into<String>, encode: E, decode: D) -> CustomFormat
    where
        E: Fn(&mut dyn WriteBuffer, &Value) -> Result<(), CodecError> + Send + Sync + 'static,
        D: Fn(&mut dyn ReadBuffer) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        CustomFormat {
            name:   name.into(),
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }
}

impl fmt::Debug for CustomFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomFormat").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Hooks and formats a textual schema refers to by name.
#[derive(Clone, Debug, Default)]
pub struct Extensions {
    hooks:   HashMap<String, Hook>,
    formats: Vec<CustomFormat>,
}

impl Extensions {
    pub fn new() -> Extensions {
        Extensions::default()
    }

    pub fn hook(mut self, name: impl Into<String>, hook: Hook) -> Extensions {
        self.hooks.insert(name.into(), hook);
        self
    }

    /// Formats registered here behave as if declared ahead of every schema
    /// definition.
    pub fn format(mut self, format: CustomFormat) -> Extensions {
        self.formats.push(format);
        self
    }

    pub fn get_hook(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }

    pub fn formats(&self) -> &[CustomFormat] {
        &self.formats
    }
}
