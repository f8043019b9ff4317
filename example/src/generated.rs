// Generated by tidewire. Do not edit.

#[allow(unused_imports)]
use tidewire::support::{check_len, count_from, count_to};
use tidewire::{CodecError, Message, ReadBuffer, WriteBuffer};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Message for Point {
    const NAME: &'static str = "Point";

    #[allow(unused_variables)]
    fn encode_fields(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError> {
        let data = self;
        buffer.write_int32(data.x)?;
        buffer.write_int32(data.y)?;
        Ok(())
    }

    #[allow(unused_mut, unused_variables)]
    fn decode_fields(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError> {
        let mut data = Self::default();
        data.x = buffer.read_int32()?;
        data.y = buffer.read_int32()?;
        Ok(data)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub id: [u8; 8],
}

impl Message for Path {
    const NAME: &'static str = "Path";
    const DISCRIMINANT: Option<i64> = Some(9);

    #[allow(unused_variables)]
    fn encode_fields(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError> {
        let data = self;
        {
            let count = data.points.len();
            buffer.write_uint16(count_to::<u16>("Path", "count", "uint16", count)?)?;
        }
        for item in &data.points {
            item.encode_fields(buffer)?;
        }
        buffer.write_uint64(&data.id)?;
        Ok(())
    }

    #[allow(unused_mut, unused_variables)]
    fn decode_fields(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError> {
        let mut data = Self::default();
        let len_0 = count_from("Path", "count", buffer.read_uint16()?)?;
        {
            let count = len_0;
            let mut items = Vec::with_capacity(count.min(buffer.remaining()));
            for _ in 0..count {
                items.push(Point::decode_fields(buffer)?);
            }
            data.points = items;
        }
        data.id = buffer.read_uint64()?;
        Ok(data)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ping {
    pub seq: u32,
}

impl Message for Ping {
    const NAME: &'static str = "Ping";
    const DISCRIMINANT: Option<i64> = Some(1);

    #[allow(unused_variables)]
    fn encode_fields(&self, buffer: &mut dyn WriteBuffer) -> Result<(), CodecError> {
        let mut data = self.clone();
        buffer.write_uint32(data.seq)?;
        crate::hooks::stamp::encode(buffer, &mut data)?;
        Ok(())
    }

    #[allow(unused_mut, unused_variables)]
    fn decode_fields(buffer: &mut dyn ReadBuffer) -> Result<Self, CodecError> {
        let mut data = Self::default();
        data.seq = buffer.read_uint32()?;
        crate::hooks::stamp::decode(buffer, &mut data)?;
        Ok(data)
    }
}
