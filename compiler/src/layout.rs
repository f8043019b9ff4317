//! Name and length resolution shared by the interpreted backend and the Rust
//! source generator.

use std::collections::{HashMap, HashSet};

use tidewire_buffer::Primitive;

use crate::{
    error::SchemaError,
    field::parse_field,
    hooks::{CustomFormat, Extensions, HookRef},
    types::{Attributes, Definition, Entry, FieldSpec, LengthSpec, MessageDefinition, Schema},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Primitive(Primitive),
    /// Index into the compiled messages.
    Message(usize),
    /// Index into the custom formats.
    Custom(usize),
}

/// Where a sequence gets its element count from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CountSource {
    /// Written immediately before the elements.
    Inline(Format),
    Fixed(usize),
    /// The value of an earlier scalar attribute.
    Sibling(String),
    /// A length field earlier in the message.
    Slot(usize),
}

#[derive(Debug, Clone)]
pub(crate) enum Step {
    Field {
        attribute: String,
        format:    Format,
        count:     Option<CountSource>,
    },
    LengthField {
        attribute: String,
        format:    Format,
        slot:      usize,
        sequences: Vec<String>,
    },
    Hook(HookRef),
    Raw(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub name:       String,
    pub attributes: Attributes,
    pub steps:      Vec<Step>,
    pub slots:      usize,
    pub fields:     Vec<FieldSpec>,
}

#[derive(Debug, Default)]
pub(crate) struct Resolved {
    pub layouts: Vec<Layout>,
    pub customs: Vec<CustomFormat>,
    pub names:   HashMap<String, Format>,
}

impl Resolved {
    fn add_custom(&mut self, format: CustomFormat) {
        self.names.insert(format.name.clone(), Format::Custom(self.customs.len()));
        self.customs.push(format);
    }

    pub fn format_name(&self, format: Format) -> &str {
        match format {
            Format::Primitive(primitive) => primitive.name(),
            Format::Message(index) => &self.layouts[index].name,
            Format::Custom(index) => &self.customs[index].name,
        }
    }
}

pub(crate) fn resolve_schema(schema: &Schema, extensions: &Extensions) -> Result<Resolved, SchemaError> {
    let mut resolved = Resolved::default();
    for format in extensions.formats() {
        resolved.add_custom(format.clone());
    }

    for definition in &schema.definitions {
        match definition {
            Definition::Custom(format) => resolved.add_custom(format.clone()),
            Definition::Message(message) => {
                let layout = resolve_message(message, &resolved.names)?;
                resolved
                    .names
                    .insert(message.name.clone(), Format::Message(resolved.layouts.len()));
                resolved.layouts.push(layout);
            }
        }
    }

    Ok(resolved)
}

fn lookup_format(names: &HashMap<String, Format>, name: &str) -> Option<Format> {
    Primitive::from_name(name)
        .map(Format::Primitive)
        .or_else(|| names.get(name).copied())
}

fn resolve_message(message: &MessageDefinition, names: &HashMap<String, Format>) -> Result<Layout, SchemaError> {
    let mut layout = Layout {
        name:       message.name.clone(),
        attributes: Attributes::new(),
        steps:      Vec::new(),
        slots:      0,
        fields:     Vec::new(),
    };
    let mut declared: HashSet<String> = HashSet::new();
    let mut scalars: HashMap<String, Format> = HashMap::new();
    let mut length_fields: HashMap<String, (usize, usize)> = HashMap::new();

    let count_format = |format: Format, field: &str, format_name: &str| match format {
        Format::Primitive(primitive) if primitive.is_integer() => Ok(format),
        Format::Custom(_) => Ok(format),
        _ => Err(SchemaError::InvalidCountFormat {
            message: message.name.clone(),
            field:   field.to_owned(),
            format:  format_name.to_owned(),
        }),
    };

    for (position, entry) in message.entries.iter().enumerate() {
        let token = match entry {
            Entry::Attributes(block) => {
                layout.attributes.extend(block.iter().map(|(k, v)| (k.clone(), v.clone())));
                continue;
            }
            Entry::Hook(hook) => {
                layout.steps.push(Step::Hook(hook.clone()));
                continue;
            }
            Entry::Raw(statement) => {
                layout.steps.push(Step::Raw(statement.clone()));
                continue;
            }
            Entry::Field(token) => token,
        };

        let spec = parse_field(token).ok_or_else(|| SchemaError::MalformedField {
            message: message.name.clone(),
            token:   token.clone(),
        })?;
        let attribute = spec.attribute.clone().unwrap_or_else(|| format!("_{}", position));
        if !declared.insert(attribute.clone()) {
            return Err(SchemaError::DuplicateField {
                message: message.name.clone(),
                field:   attribute,
            });
        }
        let format = lookup_format(names, &spec.format).ok_or_else(|| SchemaError::UnresolvedFormat {
            message: message.name.clone(),
            field:   attribute.clone(),
            format:  spec.format.clone(),
        })?;
        let unresolved = |length: String| SchemaError::UnresolvedLength {
            message: message.name.clone(),
            field:   attribute.clone(),
            length,
        };

        let count = match &spec.length {
            None => {
                scalars.insert(attribute.clone(), format);
                None
            }
            Some(LengthSpec::Declared) => {
                if spec.attribute.is_none() {
                    return Err(SchemaError::UnusedLengthField {
                        message: message.name.clone(),
                        field:   attribute,
                    });
                }
                let format = count_format(format, &attribute, &spec.format)?;
                length_fields.insert(attribute.clone(), (layout.steps.len(), layout.slots));
                layout.steps.push(Step::LengthField {
                    attribute: attribute.clone(),
                    format,
                    slot: layout.slots,
                    sequences: Vec::new(),
                });
                layout.slots += 1;
                layout.fields.push(FieldSpec {
                    attribute: Some(attribute),
                    format:    spec.format.clone(),
                    length:    spec.length.clone(),
                });
                continue;
            }
            Some(LengthSpec::Fixed(count)) => Some(CountSource::Fixed(*count)),
            Some(LengthSpec::Sibling(name)) => match scalars.get(name) {
                Some(Format::Primitive(primitive)) if primitive.is_integer() => Some(CountSource::Sibling(name.clone())),
                Some(Format::Custom(_)) => Some(CountSource::Sibling(name.clone())),
                _ => return Err(unresolved(format!(".{}", name))),
            },
            Some(LengthSpec::Named(name)) => {
                if let Some(&(step, slot)) = length_fields.get(name) {
                    if let Step::LengthField { sequences, .. } = &mut layout.steps[step] {
                        sequences.push(attribute.clone());
                    }
                    Some(CountSource::Slot(slot))
                } else if let Some(prefix) = lookup_format(names, name) {
                    Some(CountSource::Inline(count_format(prefix, &attribute, name)?))
                } else {
                    return Err(unresolved(name.clone()));
                }
            }
        };

        layout.steps.push(Step::Field {
            attribute: attribute.clone(),
            format,
            count,
        });
        layout.fields.push(FieldSpec { attribute: Some(attribute), ..spec });
    }

    for step in &layout.steps {
        if let Step::LengthField { attribute, sequences, .. } = step {
            if sequences.is_empty() {
                return Err(SchemaError::UnusedLengthField {
                    message: message.name.clone(),
                    field:   attribute.clone(),
                });
            }
        }
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(schema: Schema) -> Result<Resolved, SchemaError> {
        resolve_schema(&schema, &Extensions::new())
    }

    #[test]
    fn resolves_every_count_source() {
        let resolved = resolve(Schema::new().message("Point", [Entry::field("x:int32")]).message(
            "Bag",
            [
                Entry::field("n:uint8"),
                Entry::field("count:uint16[]"),
                Entry::field("a:Point[uint8]"),
                Entry::field("b:Point[count]"),
                Entry::field("c:int8[2]"),
                Entry::field("d:int8[.n]"),
            ],
        ))
        .unwrap();

        let bag = &resolved.layouts[1];
        assert_eq!(bag.slots, 1);
        let counts: Vec<_> = bag
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Field { count, .. } => Some(count.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            counts,
            [
                None,
                Some(CountSource::Inline(Format::Primitive(Primitive::UInt8))),
                Some(CountSource::Slot(0)),
                Some(CountSource::Fixed(2)),
                Some(CountSource::Sibling("n".into())),
            ]
        );
        assert!(matches!(
            &bag.steps[1],
            Step::LengthField { sequences, .. } if sequences == &["b".to_owned()]
        ));
        assert_eq!(resolved.format_name(Format::Message(0)), "Point");
    }

    #[test]
    fn positional_attribute_names() {
        let resolved = resolve(Schema::new().message("A", [Entry::field(":uint8"), Entry::field("x:uint8")])).unwrap();
        assert_eq!(resolved.layouts[0].fields[0].attribute.as_deref(), Some("_0"));
    }

    #[test]
    fn rejects_bad_lengths() {
        let err = resolve(Schema::new().message("A", [Entry::field("n:uint8"), Entry::field("v:uint8[n]")]));
        assert!(matches!(err, Err(SchemaError::UnresolvedLength { length, .. }) if length == "n"));

        let err = resolve(Schema::new().message("A", [Entry::field("v:uint8[n]"), Entry::field("n:uint8[]")]));
        assert!(matches!(err, Err(SchemaError::UnresolvedLength { .. })));

        let err = resolve(Schema::new().message("A", [Entry::field("n:uint8[]")]));
        assert!(matches!(err, Err(SchemaError::UnusedLengthField { field, .. }) if field == "n"));

        let err = resolve(Schema::new().message("A", [Entry::field("v:uint8[float32]")]));
        assert!(matches!(err, Err(SchemaError::InvalidCountFormat { format, .. }) if format == "float32"));

        let err = resolve(Schema::new().message("A", [Entry::field("f:float32"), Entry::field("v:uint8[.f]")]));
        assert!(matches!(err, Err(SchemaError::UnresolvedLength { length, .. }) if length == ".f"));
    }

    #[test]
    fn formats_must_be_declared_first() {
        let err = resolve(
            Schema::new()
                .message("A", [Entry::field("b:B")])
                .message("B", [Entry::field("x:uint8")]),
        );
        assert!(matches!(err, Err(SchemaError::UnresolvedFormat { format, .. }) if format == "B"));

        let err = resolve(Schema::new().message("A", [Entry::field("x:uint8"), Entry::field("x:uint16")]));
        assert!(matches!(err, Err(SchemaError::DuplicateField { field, .. }) if field == "x"));
    }
}
