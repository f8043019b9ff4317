use tidewire_buffer::Primitive;

use crate::{
    error::SchemaError,
    hooks::{Extensions, HookRef},
    layout::{resolve_schema, CountSource, Format, Layout, Resolved, Step},
    types::{AttributeValue, Schema, DISCRIMINANT_KEY},
    verifier::verify_schema,
};

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and capitalizes each word.
/// - If the string is fully uppercase, only the first letter stays uppercase.
/// - Otherwise, it ensures only the first letter is uppercase.
fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_').filter(|word| !word.is_empty()).map(|word| capitalize(word, true)).collect()
    } else {
        capitalize(s, s == s.to_uppercase())
    }
}

/// Converts a string to snake_case without splitting acronyms
/// (e.g. "sessionID" becomes "session_id").
fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl",
        "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static",
        "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

fn field_name(attribute: &str) -> String {
    escape_rust_keyword(&to_snake_case(attribute))
}

/// The native type of a 64-bit count, which the buffers carry as raw bytes.
fn wide_type(primitive: Primitive) -> Option<&'static str> {
    match primitive {
        Primitive::Int64 => Some("i64"),
        Primitive::UInt64 => Some("u64"),
        _ => None,
    }
}

fn primitive_type(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Int8 => "i8",
        Primitive::UInt8 => "u8",
        Primitive::Int16 => "i16",
        Primitive::UInt16 => "u16",
        Primitive::Int32 => "i32",
        Primitive::UInt32 => "u32",
        Primitive::Int64 | Primitive::UInt64 => "[u8; 8]",
        Primitive::Float32 => "f32",
        Primitive::Float64 => "f64",
    }
}

struct Generator<'a> {
    resolved: &'a Resolved,
    layout:   &'a Layout,
    encode:   Vec<String>,
    decode:   Vec<String>,
}

impl<'a> Generator<'a> {
    fn non_portable(&self, reason: String) -> SchemaError {
        SchemaError::NonPortable {
            message: self.layout.name.clone(),
            reason,
        }
    }

    fn rust_type(&self, format: Format) -> Result<String, SchemaError> {
        match format {
            Format::Primitive(primitive) => Ok(primitive_type(primitive).to_string()),
            Format::Message(index) => Ok(to_pascal_case(&self.resolved.layouts[index].name)),
            Format::Custom(_) => Err(self.non_portable(format!(
                "custom format {:?} has no generated form",
                self.resolved.format_name(format)
            ))),
        }
    }

    fn count_primitive(&self, format: Format) -> Result<Primitive, SchemaError> {
        match format {
            Format::Primitive(primitive) => Ok(primitive),
            _ => Err(self.non_portable(format!(
                "count format {:?} has no generated form",
                self.resolved.format_name(format)
            ))),
        }
    }

    /// A statement writing `value` (an owned expression, or a reference for messages).
    fn write_value(&self, format: Format, value: &str) -> String {
        match format {
            Format::Primitive(primitive) if wide_type(primitive).is_some() => {
                format!("buffer.write_{}(&{})?;", primitive.name(), value)
            }
            Format::Primitive(primitive) => format!("buffer.write_{}({})?;", primitive.name(), value),
            _ => format!("{}.encode_fields(buffer)?;", value),
        }
    }

    fn read_value(&self, format: Format) -> Result<String, SchemaError> {
        match format {
            Format::Primitive(primitive) => Ok(format!("buffer.read_{}()?", primitive.name())),
            _ => Ok(format!("{}::decode_fields(buffer)?", self.rust_type(format)?)),
        }
    }

    fn write_count(&self, primitive: Primitive, field: &str, count: &str) -> String {
        let message = &self.layout.name;
        match wide_type(primitive) {
            Some(wide) => format!(
                "buffer.write_{}(&count_to::<{}>({:?}, {:?}, {:?}, {})?.to_be_bytes())?;",
                primitive.name(),
                wide,
                message,
                field,
                primitive.name(),
                count
            ),
            None => format!(
                "buffer.write_{}(count_to::<{}>({:?}, {:?}, {:?}, {})?)?;",
                primitive.name(),
                primitive_type(primitive),
                message,
                field,
                primitive.name(),
                count
            ),
        }
    }

    fn read_count(&self, primitive: Primitive, field: &str) -> String {
        let message = &self.layout.name;
        match wide_type(primitive) {
            Some(wide) => format!(
                "count_from({:?}, {:?}, {}::from_be_bytes(buffer.read_{}()?))?",
                message,
                field,
                wide,
                primitive.name()
            ),
            None => format!("count_from({:?}, {:?}, buffer.read_{}()?)?", message, field, primitive.name()),
        }
    }

    /// The count of a sibling attribute as a `usize` expression.
    fn sibling_count(&self, sibling: &str, field: &str) -> String {
        let message = &self.layout.name;
        let value = format!("data.{}", field_name(sibling));
        let primitive = self.layout.steps.iter().find_map(|step| match step {
            Step::Field { attribute, format: Format::Primitive(primitive), count: None } if attribute == sibling => {
                Some(*primitive)
            }
            _ => None,
        });
        match primitive.and_then(wide_type) {
            Some(wide) => format!("count_from({:?}, {:?}, {}::from_be_bytes({}))?", message, field, wide, value),
            None => format!("count_from({:?}, {:?}, {})?", message, field, value),
        }
    }

    fn emit_field(&mut self, attribute: &str, format: Format, count: Option<&CountSource>) -> Result<(), SchemaError> {
        let message = &self.layout.name;
        let name = field_name(attribute);

        let Some(count) = count else {
            self.encode.push(self.write_value(format, &format!("data.{}", name)));
            self.decode.push(format!("data.{} = {};", name, self.read_value(format)?));
            return Ok(());
        };

        let (encode_count, decode_count) = match count {
            CountSource::Inline(prefix) => {
                let prefix = self.count_primitive(*prefix)?;
                (
                    Some(self.write_count(prefix, attribute, &format!("data.{}.len()", name))),
                    self.read_count(prefix, attribute),
                )
            }
            CountSource::Fixed(fixed) => (
                Some(format!("check_len({:?}, {:?}, {}, data.{}.len())?;", message, attribute, fixed, name)),
                fixed.to_string(),
            ),
            CountSource::Sibling(sibling) => {
                let expected = self.sibling_count(sibling, attribute);
                (
                    Some(format!("check_len({:?}, {:?}, {}, data.{}.len())?;", message, attribute, expected, name)),
                    expected,
                )
            }
            CountSource::Slot(slot) => (None, format!("len_{}", slot)),
        };

        self.encode.extend(encode_count);
        let items = match format {
            Format::Primitive(_) => format!("data.{}.iter().copied()", name),
            _ => format!("&data.{}", name),
        };
        self.encode.push(format!("for item in {} {{", items));
        self.encode.push(format!("    {}", self.write_value(format, "item")));
        self.encode.push("}".to_string());

        let read = self.read_value(format)?;
        self.decode.push("{".to_string());
        self.decode.push(format!("    let count = {};", decode_count));
        self.decode.push("    let mut items = Vec::with_capacity(count.min(buffer.remaining()));".to_string());
        self.decode.push("    for _ in 0..count {".to_string());
        self.decode.push(format!("        items.push({});", read));
        self.decode.push("    }".to_string());
        self.decode.push(format!("    data.{} = items;", name));
        self.decode.push("}".to_string());
        Ok(())
    }

    fn emit_length_field(
        &mut self,
        attribute: &str,
        format: Format,
        slot: usize,
        sequences: &[String],
    ) -> Result<(), SchemaError> {
        let primitive = self.count_primitive(format)?;
        let message = &self.layout.name;

        self.encode.push("{".to_string());
        if let Some((first, rest)) = sequences.split_first() {
            self.encode.push(format!("    let count = data.{}.len();", field_name(first)));
            for other in rest {
                self.encode.push(format!(
                    "    check_len({:?}, {:?}, count, data.{}.len())?;",
                    message,
                    other,
                    field_name(other)
                ));
            }
        }
        self.encode.push(format!("    {}", self.write_count(primitive, attribute, "count")));
        self.encode.push("}".to_string());

        self.decode
            .push(format!("let len_{} = {};", slot, self.read_count(primitive, attribute)));
        Ok(())
    }

    fn emit_hook(&mut self, hook: &HookRef) -> Result<(), SchemaError> {
        match hook {
            HookRef::Named(name) => {
                self.encode.push(format!("crate::hooks::{}::encode(buffer, &mut data)?;", name));
                self.decode.push(format!("crate::hooks::{}::decode(buffer, &mut data)?;", name));
                Ok(())
            }
            HookRef::Inline(_) => Err(self.non_portable("inline hooks are closures; register a named hook".to_string())),
        }
    }
}

fn compile_message(resolved: &Resolved, layout: &Layout, rust_code: &mut Vec<String>) -> Result<(), SchemaError> {
    let mut generator = Generator {
        resolved,
        layout,
        encode: Vec::new(),
        decode: Vec::new(),
    };
    let mut fields = Vec::new();

    for step in &layout.steps {
        match step {
            Step::Field { attribute, format, count } => {
                let rust_type = generator.rust_type(*format)?;
                let rust_type = match count {
                    None => rust_type,
                    Some(_) => format!("Vec<{}>", rust_type),
                };
                fields.push(format!("    pub {}: {},", field_name(attribute), rust_type));
                generator.emit_field(attribute, *format, count.as_ref())?;
            }
            Step::LengthField {
                attribute,
                format,
                slot,
                sequences,
            } => generator.emit_length_field(attribute, *format, *slot, sequences)?,
            Step::Hook(hook) => generator.emit_hook(hook)?,
            Step::Raw(statement) => {
                generator.encode.extend(statement.lines().map(str::to_string));
                generator.decode.extend(statement.lines().map(str::to_string));
            }
        }
    }

    let type_name = to_pascal_case(&layout.name);
    rust_code.push("#[derive(Debug, Clone, Default, PartialEq)]".to_string());
    if fields.is_empty() {
        rust_code.push(format!("pub struct {} {{}}", type_name));
    } else {
        rust_code.push(format!("pub struct {} {{", type_name));
        rust_code.extend(fields);
        rust_code.push("}".to_string());
    }
    rust_code.push(String::new());

    rust_code.push(format!("impl Message for {} {{", type_name));
    rust_code.push(format!("    const NAME: &'static str = {:?};", layout.name));
    if let Some(AttributeValue::Int(discriminant)) = layout.attributes.get(DISCRIMINANT_KEY) {
        rust_code.push(format!("    const DISCRIMINANT: Option<i64> = Some({});", discriminant));
    }
    rust_code.push(String::new());

    // Encode hooks may fill in derived fields, so they work on a copy.
    let has_hooks = layout.steps.iter().any(|step| matches!(step, Step::Hook(_)));
    rust_code.push("    #[allow(unused_variables)]".to_string());
    rust_code.push("    fn encode_fields(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError> {".to_string());
    if has_hooks {
        rust_code.push("        let mut data = self.clone();".to_string());
    } else {
        rust_code.push("        let data = self;".to_string());
    }
    rust_code.extend(generator.encode.iter().map(|line| format!("        {}", line)));
    rust_code.push("        Ok(())".to_string());
    rust_code.push("    }".to_string());
    rust_code.push(String::new());

    rust_code.push("    #[allow(unused_mut, unused_variables)]".to_string());
    rust_code.push("    fn decode_fields(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError> {".to_string());
    rust_code.push("        let mut data = Self::default();".to_string());
    rust_code.extend(generator.decode.iter().map(|line| format!("        {}", line)));
    rust_code.push("        Ok(data)".to_string());
    rust_code.push("    }".to_string());
    rust_code.push("}".to_string());
    rust_code.push(String::new());
    Ok(())
}

/// Compiles the schema into Rust source: one struct per message plus a
/// [`Message`](crate::Message) implementation mirroring the interpreted
/// procedures byte for byte.
///
/// Raw statements are spliced into both procedures, where `data` is the
/// message being encoded (`&Self`, or a `Self` copy when the message has
/// hooks) or decoded (`Self`). A named hook `@name` becomes a call to
/// `crate::hooks::name::encode(buffer, &mut data)` and
/// `crate::hooks::name::decode(buffer, &mut data)`, which the including crate
/// provides. Inline hooks and custom formats have no source form and are
/// rejected with [`SchemaError::NonPortable`].
pub fn compile_schema_to_rust(schema: &Schema) -> Result<String, SchemaError> {
    let extensions = Extensions::new();
    verify_schema(schema, &extensions)?;
    let resolved = resolve_schema(schema, &extensions)?;

    let mut rust_code: Vec<String> = vec![
        "// Generated by tidewire. Do not edit.".to_string(),
        String::new(),
        "#[allow(unused_imports)]".to_string(),
        "use tidewire::support::{check_len, count_from, count_to};".to_string(),
        "use tidewire::{CodecError, Message, ReadBuffer, WriteBuffer};".to_string(),
        String::new(),
    ];

    for layout in &resolved.layouts {
        compile_message(&resolved, layout, &mut rust_code)?;
    }

    // Drop the trailing blank line.
    rust_code.pop();
    Ok(rust_code.join("\n") + "\n")
}
