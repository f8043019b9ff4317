use std::collections::HashMap;

use tidewire_buffer::Primitive;

use crate::{
    error::SchemaError,
    hooks::Extensions,
    types::{AttributeValue, Definition, Schema, DISCRIMINANT_KEY},
};

/// Names that may never be used for a definition.
pub const RESERVED_NAMES: [&str; 12] = [
    "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64", "uint64", "float32", "float64", "float",
    "double",
];

/// Checks the schema-wide rules: unique, unreserved definition names and a
/// well-formed, collision-free discriminant per message. Field-level rules
/// are checked while compiling each message.
pub fn verify_schema(schema: &Schema, extensions: &Extensions) -> Result<(), SchemaError> {
    let mut defined: Vec<&str> = Vec::new();
    let names = extensions
        .formats()
        .iter()
        .map(|format| format.name.as_str())
        .chain(schema.definitions.iter().map(Definition::name));

    for name in names {
        if RESERVED_NAMES.contains(&name) || Primitive::from_name(name).is_some() {
            return Err(SchemaError::ReservedName(name.to_owned()));
        }
        if defined.contains(&name) {
            return Err(SchemaError::DuplicateMessage(name.to_owned()));
        }
        defined.push(name);
    }

    let mut discriminants: HashMap<i64, &str> = HashMap::new();
    for definition in &schema.definitions {
        let Definition::Message(message) = definition else {
            continue;
        };
        match message.attributes().get(DISCRIMINANT_KEY) {
            None => {}
            Some(AttributeValue::Text(text)) => {
                return Err(SchemaError::InvalidAttribute {
                    message: message.name.clone(),
                    key:     DISCRIMINANT_KEY.to_owned(),
                    reason:  format!("expected an integer, found {:?}", text),
                });
            }
            Some(AttributeValue::Int(value)) => {
                if let Some(first) = discriminants.insert(*value, &message.name) {
                    return Err(SchemaError::DuplicateDiscriminant {
                        value:  *value,
                        first:  first.to_owned(),
                        second: message.name.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entry;

    #[test]
    fn rejects_duplicate_and_reserved_names() {
        let schema = Schema::new().message("A", []).message("A", []);
        assert_eq!(
            verify_schema(&schema, &Extensions::new()),
            Err(SchemaError::DuplicateMessage("A".into()))
        );

        let schema = Schema::new().message("double", []);
        assert_eq!(
            verify_schema(&schema, &Extensions::new()),
            Err(SchemaError::ReservedName("double".into()))
        );
    }

    #[test]
    fn rejects_bad_discriminants() {
        let schema = Schema::new()
            .message("A", [Entry::attributes([("index", 3)])])
            .message("B", [Entry::attributes([("index", 3)])]);
        assert_eq!(
            verify_schema(&schema, &Extensions::new()),
            Err(SchemaError::DuplicateDiscriminant { value: 3, first: "A".into(), second: "B".into() })
        );

        let schema = Schema::new().message("A", [Entry::attributes([("index", "three")])]);
        assert!(matches!(
            verify_schema(&schema, &Extensions::new()),
            Err(SchemaError::InvalidAttribute { key, .. }) if key == "index"
        ));
    }

    #[test]
    fn later_attribute_blocks_override_earlier_ones() {
        let schema = Schema::new()
            .message("A", [Entry::attributes([("index", 3)]), Entry::attributes([("index", 4)])])
            .message("B", [Entry::attributes([("index", 3)])]);
        assert_eq!(verify_schema(&schema, &Extensions::new()), Ok(()));
    }
}
