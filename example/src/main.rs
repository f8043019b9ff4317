// example/src/main.rs

mod generated;
mod hooks;

use tidewire::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Bring the generated types into scope:
use generated::{Path, Ping, Point};

const SCHEMA: &str = include_str!("../schema.tw");

fn extensions() -> Extensions {
    Extensions::new().hook("stamp", hooks::stamp::hook())
}

/// Writes a generated message preceded by its discriminant as a `uint8` tag.
fn write_tagged<M: Message>(buffer: &mut dyn WriteBuffer, message: &M) -> Result<(), CodecError> {
    let discriminant = M::DISCRIMINANT.ok_or_else(|| CodecError::InvalidTag(M::NAME.to_owned()))?;
    let tag = u8::try_from(discriminant).map_err(|_| CodecError::InvalidTag(M::NAME.to_owned()))?;
    write_atomically(buffer, |buffer| {
        buffer.write_uint8(tag)?;
        message.encode(buffer)
    })
}

fn main() -> Result<(), WireError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let container = compile_source(SCHEMA, &extensions())?;
    let config = BufferConfig::new(Endian::Big, 256);

    // Sending side: the generated structs.
    let path = Path {
        points: vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }],
        id:     42u64.to_be_bytes(),
    };
    let mut out = config.linear();
    for seq in 0..3 {
        write_tagged(&mut out, &Ping { seq })?;
    }
    write_tagged(&mut out, &path)?;
    info!(bytes = out.len(), "encoded stream");

    // Receiving side: the interpreted container, fed a few bytes at a time
    // the way a socket would deliver them.
    let mut ring = config.ring();
    for chunk in out.to_byte_range().chunks(5) {
        ring.add(chunk)?;
        while let Some((name, record)) = poll_tagged(&container, Primitive::UInt8, &mut ring)? {
            println!("{:<5} {}", name, record_to_json(&record));
        }
    }
    if !ring.is_empty() {
        warn!(left = ring.len(), "stream ended inside a message");
    }

    // And back through the generated decoders.
    let mut ring = config.ring();
    ring.add(out.to_byte_range())?;
    while ring.remaining() > 0 {
        let tag = i64::from(ring.read_uint8()?);
        if Some(tag) == Ping::DISCRIMINANT {
            println!("{:?}", Ping::decode(&mut ring)?);
        } else if Some(tag) == Path::DISCRIMINANT {
            let path = Path::decode(&mut ring)?;
            println!("Path id={} points={:?}", u64::from_be_bytes(path.id), path.points);
        } else {
            return Err(CodecError::UnknownDiscriminant(tag).into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_is_current() {
        let schema = parse_source(SCHEMA).unwrap();
        assert_eq!(compile_schema_to_rust(&schema).unwrap(), include_str!("generated.rs"));
    }

    #[test]
    fn test_generated_and_interpreted_agree() {
        let container = compile_source(SCHEMA, &extensions()).unwrap();
        let path = Path {
            points: vec![Point { x: -5, y: 6 }],
            id:     u64::MAX.to_be_bytes(),
        };

        let mut out = LinearWriteBuffer::new(Endian::Little, 64);
        path.encode(&mut out).unwrap();

        let mut ring = RingReadBuffer::new(Endian::Little, 64);
        ring.add(out.to_byte_range()).unwrap();
        let record = container.decode("Path", &mut ring).unwrap();
        assert_eq!(record["id"], Value::uint64(u64::MAX));
        assert_eq!(record["points"][0].get("x"), Some(&Value::Int32(-5)));

        let mut again = LinearWriteBuffer::new(Endian::Little, 64);
        container.encode("Path", &mut again, &record).unwrap();
        assert_eq!(again.to_byte_range(), out.to_byte_range());

        ring.clear();
        ring.add(again.to_byte_range()).unwrap();
        assert_eq!(Path::decode(&mut ring).unwrap(), path);
    }

    #[test]
    fn test_failed_generated_encode_is_rolled_back() {
        let path = Path {
            points: vec![Point { x: 1, y: 2 }; 2],
            id:     [7; 8],
        };
        let mut out = LinearWriteBuffer::new(Endian::Big, 12);
        out.write_uint8(0xee).unwrap();

        assert!(path.encode(&mut out).unwrap_err().is_incomplete());
        assert_eq!(out.to_byte_range(), [0xee]);
        assert_eq!(out.position(), 1);
    }

    #[test]
    fn test_stamp_rejects_corruption() {
        let container = compile_source(SCHEMA, &extensions()).unwrap();
        let mut out = LinearWriteBuffer::new(Endian::Big, 16);
        Ping { seq: 0x0102 }.encode(&mut out).unwrap();
        assert_eq!(out.to_byte_range(), [0, 0, 1, 2, 3]);

        let mut ring = RingReadBuffer::new(Endian::Big, 16);
        ring.add(&[0, 0, 1, 2, 4]).unwrap();
        assert!(matches!(Ping::decode(&mut ring), Err(CodecError::Hook(_))));
        assert_eq!(ring.position(), 0);

        assert!(matches!(container.decode("Ping", &mut ring), Err(CodecError::Hook(_))));
        assert_eq!(ring.position(), 0);
    }
}
