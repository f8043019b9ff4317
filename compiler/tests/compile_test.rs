#![cfg(test)]

use tidewire_buffer::{Endian, LinearWriteBuffer, Primitive, ReadBuffer, Record, RingReadBuffer, Value, WriteBuffer};
use tidewire_compiler::{
    compile, compile_schema_to_rust, compile_source, parse_source, AttributeValue, CodecError, CompiledContainer,
    CustomFormat, Entry, Extensions, Hook, Schema, SchemaError,
};

const PATH_SCHEMA: &str = r#"
// A polyline and its vertices.
Point = [x:int32, y:int32];
Path  = [.attributes{index: 7}, count:uint16[], points:Point[count]];
"#;

const PATH_BYTES: [u8; 18] = [0, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4];

fn point(x: i32, y: i32) -> Value {
    Value::Record(Record::new().with("x", x).with("y", y))
}

fn path() -> Record {
    Record::new().with("points", vec![point(1, 2), point(3, 4)])
}

fn encode(container: &CompiledContainer, name: &str, endian: Endian, record: &Record) -> Result<Vec<u8>, CodecError> {
    let mut out = LinearWriteBuffer::new(endian, 256);
    container.encode(name, &mut out, record)?;
    Ok(out.to_vec())
}

fn decode(container: &CompiledContainer, name: &str, endian: Endian, bytes: &[u8]) -> Result<Record, CodecError> {
    let mut ring = RingReadBuffer::new(endian, 256);
    ring.add(bytes)?;
    let record = container.decode(name, &mut ring)?;
    assert_eq!(ring.remaining(), 0, "{} left bytes behind", name);
    Ok(record)
}

fn compile_text(text: &str) -> CompiledContainer {
    compile_source(text, &Extensions::new()).expect("schema should compile")
}

#[test]
fn test_path_with_length_field() {
    let container = compile_text(PATH_SCHEMA);

    assert_eq!(encode(&container, "Path", Endian::Big, &path()).unwrap(), PATH_BYTES);
    assert_eq!(decode(&container, "Path", Endian::Big, &PATH_BYTES).unwrap(), path());
    assert_eq!(container.lookup_name_by_discriminant(7), Some("Path"));
}

#[test]
fn test_path_little_endian() {
    let container = compile_text(PATH_SCHEMA);
    let bytes = [2, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0];

    assert_eq!(encode(&container, "Path", Endian::Little, &path()).unwrap(), bytes);
    assert_eq!(decode(&container, "Path", Endian::Little, &bytes).unwrap(), path());
}

#[test]
fn test_every_count_policy_gives_the_same_bytes() {
    let inline = compile_text("Point = [x:int32, y:int32]; Path = [points:Point[uint16]];");
    assert_eq!(encode(&inline, "Path", Endian::Big, &path()).unwrap(), PATH_BYTES);
    assert_eq!(decode(&inline, "Path", Endian::Big, &PATH_BYTES).unwrap(), path());

    let sibling = compile_text("Point = [x:int32, y:int32]; Path = [n:uint16, points:Point[.n]];");
    let record = path().with("n", 2u16);
    assert_eq!(encode(&sibling, "Path", Endian::Big, &record).unwrap(), PATH_BYTES);
    assert_eq!(decode(&sibling, "Path", Endian::Big, &PATH_BYTES).unwrap(), record);

    let fixed = compile_text("Point = [x:int32, y:int32]; Path = [n:uint16, points:Point[2]];");
    assert_eq!(encode(&fixed, "Path", Endian::Big, &record).unwrap(), PATH_BYTES);
    assert_eq!(decode(&fixed, "Path", Endian::Big, &PATH_BYTES).unwrap(), record);
}

#[test]
fn test_zero_length_sequences() {
    let container = compile_text(PATH_SCHEMA);
    let empty = Record::new().with("points", Vec::<Value>::new());

    assert_eq!(encode(&container, "Path", Endian::Big, &empty).unwrap(), [0, 0]);
    assert_eq!(decode(&container, "Path", Endian::Big, &[0, 0]).unwrap(), empty);

    let fixed = compile_text("Empty = [none:uint32[0]];");
    assert!(encode(&fixed, "Empty", Endian::Big, &empty).is_err());
    let none = Record::new().with("none", Vec::<Value>::new());
    assert_eq!(encode(&fixed, "Empty", Endian::Big, &none).unwrap(), Vec::<u8>::new());
    assert_eq!(decode(&fixed, "Empty", Endian::Big, &[]).unwrap(), none);

    let bytes = compile_text("Blob = [data:uint8[uint16], tail:uint8];");
    let record = Record::new().with("data", Vec::<Value>::new()).with("tail", 9u8);
    assert_eq!(encode(&bytes, "Blob", Endian::Big, &record).unwrap(), [0, 0, 9]);
    assert_eq!(decode(&bytes, "Blob", Endian::Big, &[0, 0, 9]).unwrap(), record);

    let inline = compile_text("Point = [x:int32, y:int32]; Path = [points:Point[uint16], tail:uint8];");
    let record = empty.clone().with("tail", 9u8);
    assert_eq!(encode(&inline, "Path", Endian::Big, &record).unwrap(), [0, 0, 9]);
    assert_eq!(decode(&inline, "Path", Endian::Big, &[0, 0, 9]).unwrap(), record);

    let sibling = compile_text("Point = [x:int32, y:int32]; Path = [n:uint16, points:Point[.n], tail:uint8];");
    let record = empty.with("n", 0u16).with("tail", 9u8);
    assert_eq!(encode(&sibling, "Path", Endian::Big, &record).unwrap(), [0, 0, 9]);
    assert_eq!(decode(&sibling, "Path", Endian::Big, &[0, 0, 9]).unwrap(), record);
}

#[test]
fn test_length_mismatches() {
    let sibling = compile_text("Point = [x:int32, y:int32]; Path = [n:uint16, points:Point[.n]];");
    assert_eq!(
        encode(&sibling, "Path", Endian::Big, &path().with("n", 3u16)),
        Err(CodecError::LengthMismatch {
            message:  "Path".into(),
            field:    "points".into(),
            expected: 3,
            actual:   2,
        })
    );

    let fixed = compile_text("Pad = [pad:uint8[3]];");
    let short = Record::new().with("pad", vec![Value::UInt8(0), Value::UInt8(0)]);
    assert!(matches!(
        encode(&fixed, "Pad", Endian::Big, &short),
        Err(CodecError::LengthMismatch { expected: 3, actual: 2, .. })
    ));

    let shared = compile_text("Pair = [n:uint8[], a:uint8[n], b:uint8[n]];");
    let pair = Record::new()
        .with("a", vec![Value::UInt8(1), Value::UInt8(2)])
        .with("b", vec![Value::UInt8(3), Value::UInt8(4)]);
    assert_eq!(encode(&shared, "Pair", Endian::Big, &pair).unwrap(), [2, 1, 2, 3, 4]);
    assert_eq!(decode(&shared, "Pair", Endian::Big, &[2, 1, 2, 3, 4]).unwrap(), pair);

    let uneven = pair.with("b", vec![Value::UInt8(3)]);
    assert!(matches!(
        encode(&shared, "Pair", Endian::Big, &uneven),
        Err(CodecError::LengthMismatch { field, expected: 2, actual: 1, .. }) if field == "b"
    ));
}

#[test]
fn test_count_overflow() {
    let container = compile_text("Bytes = [data:uint8[uint8]];");
    let record = Record::new().with("data", vec![Value::UInt8(0); 256]);
    assert_eq!(
        encode(&container, "Bytes", Endian::Big, &record),
        Err(CodecError::CountOverflow {
            message: "Bytes".into(),
            field:   "data".into(),
            format:  "uint8".into(),
            count:   256,
        })
    );
}

#[test]
fn test_negative_count_is_rejected() {
    let container = compile_text("Bytes = [data:uint8[int8]];");
    assert!(matches!(
        decode(&container, "Bytes", Endian::Big, &[0xff]),
        Err(CodecError::InvalidCount { field, .. }) if field == "data"
    ));
}

#[test]
fn test_missing_and_mistyped_fields() {
    let container = compile_text(PATH_SCHEMA);
    assert_eq!(
        encode(&container, "Path", Endian::Big, &Record::new()),
        Err(CodecError::MissingField { message: "Path".into(), field: "points".into() })
    );
    assert!(matches!(
        encode(&container, "Path", Endian::Big, &Record::new().with("points", 1u8)),
        Err(CodecError::TypeMismatch { expected, found, .. }) if expected == "array" && found == "uint8"
    ));
    assert!(matches!(
        encode(&container, "Point", Endian::Big, &Record::new().with("x", 1u8).with("y", 1.0f32)),
        Err(CodecError::TypeMismatch { field, expected, .. }) if field == "y" && expected == "int32"
    ));
    assert_eq!(
        encode(&container, "Nope", Endian::Big, &Record::new()),
        Err(CodecError::UnknownMessage("Nope".into()))
    );
}

#[test]
fn test_failed_encode_leaves_the_buffer_untouched() {
    let container = compile_text(PATH_SCHEMA);
    let mut out = LinearWriteBuffer::new(Endian::Big, 32);

    let bad_point = Record::new().with("x", 1i32).with("y", 1.0f32);
    assert!(matches!(
        container.encode("Point", &mut out, &bad_point),
        Err(CodecError::TypeMismatch { field, .. }) if field == "y"
    ));
    assert_eq!((out.position(), out.len()), (0, 0));

    // Overwriting earlier output: the bytes under the cursor come back too.
    out.write(&[9, 9, 9, 9, 9, 9]).unwrap();
    out.skip_to(2).unwrap();
    let bad_path = Record::new().with("points", vec![point(1, 2), Value::UInt8(0)]);
    assert!(container.encode("Path", &mut out, &bad_path).is_err());
    assert_eq!(out.to_byte_range(), [9, 9, 9, 9, 9, 9]);
    assert_eq!(out.position(), 2);

    assert!(container.encode_value("Point", &mut out, &Value::Record(bad_point)).is_err());
    assert!(container.encode_tagged("Path", Primitive::UInt8, &mut out, &bad_path).is_err());
    assert_eq!(out.to_byte_range(), [9, 9, 9, 9, 9, 9]);
    assert_eq!(out.position(), 2);
}

#[test]
fn test_failed_decode_rewinds_the_cursor() {
    let container = compile_text(PATH_SCHEMA);
    let mut ring = RingReadBuffer::new(Endian::Big, 32);
    ring.add(&[0xee]).unwrap();
    ring.skip(1).unwrap();
    ring.add(&PATH_BYTES[..7]).unwrap();

    assert!(container.decode("Path", &mut ring).unwrap_err().is_incomplete());
    assert_eq!(ring.position(), 1);
    assert!(container.decode_tagged(Primitive::UInt8, &mut ring).is_err());
    assert_eq!(ring.position(), 1);
    assert_eq!(ring.remaining(), 7);
}

#[test]
fn test_wide_and_float_primitives() {
    let container = compile_text("W = [id:uint64, t:int64, a:float, b:double];");
    let record = Record::new()
        .with("id", 1u64)
        .with("t", -1i64)
        .with("a", 1.5f32)
        .with("b", -2.0f64);

    let bytes = encode(&container, "W", Endian::Little, &record).unwrap();
    assert_eq!(&bytes[..8], [1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(&bytes[8..16], [0xff; 8]);
    assert_eq!(&bytes[16..20], [0, 0, 0xc0, 0x3f]);
    assert_eq!(&bytes[20..], [0, 0, 0, 0, 0, 0, 0, 0xc0]);
    assert_eq!(decode(&container, "W", Endian::Little, &bytes).unwrap(), record);
}

#[test]
fn test_positional_attribute_names() {
    let container = compile_text("P = [:uint8, :uint8, last:uint8];");
    assert_eq!(
        decode(&container, "P", Endian::Big, &[1, 2, 3]).unwrap(),
        Record::new().with("_0", 1u8).with("_1", 2u8).with("last", 3u8)
    );
}

#[test]
fn test_incomplete_input_can_be_retried() {
    let container = compile_text(PATH_SCHEMA);
    let mut ring = RingReadBuffer::new(Endian::Big, 32);

    ring.add(&PATH_BYTES[..5]).unwrap();
    let err = container.decode("Path", &mut ring).unwrap_err();
    assert!(err.is_incomplete());

    ring.reset();
    ring.add(&PATH_BYTES[5..]).unwrap();
    assert_eq!(container.decode("Path", &mut ring).unwrap(), path());
    assert_eq!(ring.position(), PATH_BYTES.len());
}

#[test]
fn test_dispatch_by_discriminant() {
    let container = compile_text("A = [.attributes{index: 3}, v:uint8];\nB = [.attributes{index: 7}, v:uint16];");

    assert_eq!(container.lookup_name_by_discriminant(3), Some("A"));
    assert_eq!(container.lookup_name_by_discriminant(7), Some("B"));
    assert_eq!(container.lookup_name_by_discriminant(5), None);
    assert_eq!(container.discriminant("B"), Some(7));

    let mut ring = RingReadBuffer::new(Endian::Big, 16);
    ring.add(&[7, 1, 2, 3, 9]).unwrap();
    let (name, record) = container.decode_tagged(Primitive::UInt8, &mut ring).unwrap();
    assert_eq!(name, "B");
    assert_eq!(record, Record::new().with("v", 0x0102u16));
    let (name, record) = container.decode_tagged(Primitive::UInt8, &mut ring).unwrap();
    assert_eq!((name, record), ("A", Record::new().with("v", 9u8)));

    ring.add(&[5]).unwrap();
    assert_eq!(
        container.decode_tagged(Primitive::UInt8, &mut ring).unwrap_err(),
        CodecError::UnknownDiscriminant(5)
    );
    assert_eq!(
        container.decode_tagged(Primitive::Float32, &mut ring).unwrap_err(),
        CodecError::InvalidTag("float32".into())
    );

    let mut out = LinearWriteBuffer::new(Endian::Big, 16);
    container
        .encode_tagged("B", Primitive::UInt16, &mut out, &Record::new().with("v", 1u16))
        .unwrap();
    assert_eq!(out.to_byte_range(), [0, 7, 0, 1]);
}

#[test]
fn test_attribute_lookups() {
    let container = compile_text(
        "A = [.attributes{index: 1, kind: \"shape\", rev: 2}];\n\
         B = [.attributes{kind: shape}, .attributes{rev: 3}];",
    );

    assert_eq!(container.lookup_name_by_attribute("kind", &"shape".into()), Some("B"));
    assert_eq!(container.lookup_name_by_attribute("rev", &AttributeValue::Int(2)), Some("A"));
    assert_eq!(container.lookup_name_by_attribute("rev", &AttributeValue::Int(4)), None);
    assert_eq!(container.lookup_name_by_attribute("index", &AttributeValue::Int(1)), Some("A"));

    let attributes = container.attributes("B").unwrap();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes["rev"], AttributeValue::Int(3));
    assert_eq!(container.discriminant("B"), None);
    assert_eq!(container.message_names().collect::<Vec<_>>(), ["A", "B"]);
}

#[test]
fn test_named_hooks() {
    let extensions = Extensions::new().hook(
        "stamp",
        Hook::on_encode(|buffer, _record| {
            buffer.write_uint8(0xaa)?;
            Ok(())
        })
        .and_decode(|buffer, record| {
            let stamp = buffer.read_uint8()?;
            record.set("stamp", stamp);
            Ok(())
        }),
    );
    let container = compile_source("Stamped = [x:uint8, @stamp, y:uint8];", &extensions).unwrap();

    let record = Record::new().with("x", 1u8).with("y", 2u8);
    assert_eq!(encode(&container, "Stamped", Endian::Big, &record).unwrap(), [1, 0xaa, 2]);
    assert_eq!(
        decode(&container, "Stamped", Endian::Big, &[1, 0xbb, 2]).unwrap(),
        record.with("stamp", 0xbbu8)
    );

    assert_eq!(
        compile_source("Stamped = [@stamp];", &Extensions::new()).unwrap_err(),
        SchemaError::UnknownHook("stamp".into())
    );
}

#[test]
fn test_encode_hook_fills_in_derived_fields() {
    let extensions = Extensions::new().hook(
        "count",
        Hook::on_encode(|_buffer, record| {
            let len = match record.get("items") {
                Some(Value::Array(items)) => items.len(),
                _ => return Err(CodecError::Hook("items missing".into())),
            };
            record.set("len", len as u8);
            Ok(())
        }),
    );
    let container = compile_source("Bag = [@count, len:uint8, items:uint8[.len]];", &extensions).unwrap();

    let record = Record::new().with("items", vec![Value::UInt8(0xa), Value::UInt8(0xb)]);
    assert_eq!(encode(&container, "Bag", Endian::Big, &record).unwrap(), [2, 0xa, 0xb]);
    assert_eq!(record.get("len"), None);
    assert_eq!(
        decode(&container, "Bag", Endian::Big, &[2, 0xa, 0xb]).unwrap(),
        record.with("len", 2u8)
    );
}

#[test]
fn test_inline_checksum_hook() {
    fn sum(record: &Record) -> u8 {
        ["a", "b"]
            .iter()
            .filter_map(|name| record.get(name).and_then(Value::as_integer))
            .fold(0u8, |acc, value| acc.wrapping_add(value as u8))
    }

    let checksum = Hook::on_encode(|buffer, record| {
        buffer.write_uint8(sum(record))?;
        Ok(())
    })
    .and_decode(|buffer, record| {
        if buffer.read_uint8()? != sum(record) {
            return Err(CodecError::Hook("checksum mismatch".into()));
        }
        Ok(())
    });

    let schema = Schema::new().message(
        "Checked",
        [Entry::field("a:uint8"), Entry::field("b:uint8"), Entry::hook(checksum)],
    );
    let container = compile(&schema, &Extensions::new()).unwrap();

    let record = Record::new().with("a", 200u8).with("b", 100u8);
    assert_eq!(encode(&container, "Checked", Endian::Big, &record).unwrap(), [200, 100, 44]);
    assert_eq!(decode(&container, "Checked", Endian::Big, &[200, 100, 44]).unwrap(), record);
    assert_eq!(
        decode(&container, "Checked", Endian::Big, &[200, 100, 45]),
        Err(CodecError::Hook("checksum mismatch".into()))
    );
}

fn text8() -> CustomFormat {
    CustomFormat::new(
        "text8",
        |buffer, value| {
            let text = value.as_text();
            buffer.write_uint8(text.len() as u8)?;
            buffer.write_text(text)?;
            Ok(())
        },
        |buffer| {
            let len = buffer.read_uint8()? as usize;
            let bytes = buffer.read(len)?;
            String::from_utf8(bytes)
                .map(Value::Text)
                .map_err(|err| CodecError::Hook(err.to_string()))
        },
    )
}

fn count8() -> CustomFormat {
    CustomFormat::new(
        "count8",
        |buffer, value| {
            let count = value.as_count().ok_or_else(|| CodecError::Hook("not a count".into()))?;
            buffer.write_uint8(count as u8)?;
            Ok(())
        },
        |buffer| Ok(Value::UInt8(buffer.read_uint8()?)),
    )
}

#[test]
fn test_custom_formats() {
    let schema = Schema::new()
        .custom(text8())
        .custom(count8())
        .message("Tags", [Entry::field("owner:text8"), Entry::field("tags:text8[count8]")]);
    let container = compile(&schema, &Extensions::new()).unwrap();

    let record = Record::new()
        .with("owner", "me")
        .with("tags", vec![Value::from("a"), Value::from("bc")]);
    let bytes = [2, b'm', b'e', 2, 1, b'a', 2, b'b', b'c'];
    assert_eq!(encode(&container, "Tags", Endian::Big, &record).unwrap(), bytes);
    assert_eq!(decode(&container, "Tags", Endian::Big, &bytes).unwrap(), record);

    let mut out = LinearWriteBuffer::new(Endian::Big, 8);
    container.encode_value("text8", &mut out, &Value::from("hi")).unwrap();
    container.encode_value("uint16", &mut out, &Value::UInt16(5)).unwrap();
    assert_eq!(out.to_byte_range(), [2, b'h', b'i', 0, 5]);
}

#[test]
fn test_extension_formats_in_text_schemas() {
    let extensions = Extensions::new().format(text8());
    let container = compile_source("User = [name:text8, age:uint8];", &extensions).unwrap();
    let record = Record::new().with("name", "bo").with("age", 9u8);
    assert_eq!(encode(&container, "User", Endian::Big, &record).unwrap(), [2, b'b', b'o', 9]);
}

#[test]
fn test_schema_errors() {
    let err = |text: &str| compile_source(text, &Extensions::new()).unwrap_err();

    assert!(matches!(err("A = [x:Nope];"), SchemaError::UnresolvedFormat { format, .. } if format == "Nope"));
    assert_eq!(
        err("A = [.attributes{index: 1}];\nB = [.attributes{index: 1}];"),
        SchemaError::DuplicateDiscriminant { value: 1, first: "A".into(), second: "B".into() }
    );
    assert!(matches!(err("A = [`let x = 1;`];"), SchemaError::NonPortable { message, .. } if message == "A"));
    assert!(matches!(err("A = [x:int32"), SchemaError::Parse { .. }));
    assert!(matches!(err("A = [x:uint8, v:uint8[Point]];"), SchemaError::UnresolvedLength { .. }));
    assert!(matches!(
        err("P = [x:uint8]; A = [v:uint8[P]];"),
        SchemaError::InvalidCountFormat { format, .. } if format == "P"
    ));
    assert_eq!(err("A = [];\nA = [];"), SchemaError::DuplicateMessage("A".into()));
    assert_eq!(err("uint8 = [];"), SchemaError::ReservedName("uint8".into()));
}

#[test]
fn test_summary_lists_fields() {
    let container = compile_text(PATH_SCHEMA);
    let summary = container.summary();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[1].name, "Path");
    assert_eq!(summary[1].fields.iter().map(|f| f.to_string()).collect::<Vec<_>>(), [
        "count:uint16[]",
        "points:Point[count]"
    ]);
    assert_eq!(
        serde_json::to_value(&summary[0]).unwrap(),
        serde_json::json!({
            "name": "Point",
            "attributes": {},
            "fields": [
                {"attribute": "x", "format": "int32"},
                {"attribute": "y", "format": "int32"}
            ],
            "hooks": 0
        })
    );
}

#[test]
fn test_container_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompiledContainer>();

    let container = compile_text(PATH_SCHEMA);
    std::thread::scope(|scope| {
        for endian in [Endian::Big, Endian::Little] {
            let container = &container;
            scope.spawn(move || {
                let bytes = encode(container, "Path", endian, &path()).unwrap();
                assert_eq!(decode(container, "Path", endian, &bytes).unwrap(), path());
            });
        }
    });
}

#[test]
fn test_parse_source_keeps_positions() {
    let schema = parse_source(PATH_SCHEMA).unwrap();
    assert_eq!(schema.definitions.len(), 2);
    match schema.get("Path") {
        Some(tidewire_compiler::Definition::Message(path)) => assert_eq!((path.line, path.column), (4, 1)),
        other => panic!("unexpected definition {:?}", other),
    }
}

#[test]
fn test_gen_rust_path() {
    let schema = parse_source(PATH_SCHEMA).unwrap();
    let code = compile_schema_to_rust(&schema).unwrap();

    assert!(code.starts_with("// Generated by tidewire. Do not edit.\n"));
    assert!(code.contains("pub struct Point {\n    pub x: i32,\n    pub y: i32,\n}"));
    assert!(code.contains("pub struct Path {\n    pub points: Vec<Point>,\n}"));
    assert!(code.contains("    fn encode_fields(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError> {\n        let data = self;\n"));
    assert!(code.contains("    fn decode_fields(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError> {\n"));
    assert!(code.contains("impl Message for Path {\n    const NAME: &'static str = \"Path\";\n    const DISCRIMINANT: Option<i64> = Some(7);"));
    assert!(code.contains("        buffer.write_int32(data.x)?;\n"));
    assert!(code.contains("        data.y = buffer.read_int32()?;\n"));
    assert!(code.contains("            let count = data.points.len();\n"));
    assert!(code.contains("            buffer.write_uint16(count_to::<u16>(\"Path\", \"count\", \"uint16\", count)?)?;\n"));
    assert!(code.contains("        for item in &data.points {\n            item.encode_fields(buffer)?;\n        }\n"));
    assert!(code.contains("        let len_0 = count_from(\"Path\", \"count\", buffer.read_uint16()?)?;\n"));
    assert!(code.contains("            let count = len_0;\n"));
    assert!(code.contains("                items.push(Point::decode_fields(buffer)?);\n"));
    assert!(code.contains("            data.points = items;\n"));
}

#[test]
fn test_gen_rust_hooks_and_raw_statements() {
    let schema = parse_source("Frame = [id:uint64, @crc, `let _ = data.id;`, body:uint8[.id], tail:uint8[uint32]];").unwrap();
    let code = compile_schema_to_rust(&schema).unwrap();

    assert!(code.contains("    pub id: [u8; 8],\n"));
    assert!(code.contains("        buffer.write_uint64(&data.id)?;\n"));
    assert!(code.contains("        let mut data = self.clone();\n"));
    assert!(code.contains("        crate::hooks::crc::encode(buffer, &mut data)?;\n"));
    assert!(code.contains("        crate::hooks::crc::decode(buffer, &mut data)?;\n"));
    assert_eq!(code.matches("        let _ = data.id;\n").count(), 2);
    assert!(code.contains("check_len(\"Frame\", \"body\", count_from(\"Frame\", \"body\", u64::from_be_bytes(data.id))?, data.body.len())?;"));
    assert!(code.contains("        for item in data.tail.iter().copied() {\n            buffer.write_uint8(item)?;\n        }\n"));
}

#[test]
fn test_gen_rust_rejects_closures() {
    let schema = Schema::new().message("A", [Entry::hook(Hook::default())]);
    assert!(matches!(compile_schema_to_rust(&schema), Err(SchemaError::NonPortable { .. })));

    let schema = Schema::new().custom(text8()).message("B", [Entry::field("name:text8")]);
    assert!(matches!(compile_schema_to_rust(&schema), Err(SchemaError::NonPortable { message, .. }) if message == "B"));
}
