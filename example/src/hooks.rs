//! Hooks named in `schema.tw`. Generated code calls `hooks::<name>::encode`
//! and `decode` directly; the interpreted container gets the same logic
//! through [`Hook`] closures.

pub mod stamp {
    use tidewire::{CodecError, Hook, ReadBuffer, Record, Value, WriteBuffer};

    use crate::generated::Ping;

    /// One byte after the sequence number: the wrapping sum of its bytes.
    pub fn checksum(seq: u32) -> u8 {
        seq.to_be_bytes().iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
    }

    fn verify(seq: u32, found: u8) -> Result<(), CodecError> {
        let expected = checksum(seq);
        if expected != found {
            return Err(CodecError::Hook(format!(
                "ping {} carries checksum {:#04x}, expected {:#04x}",
                seq, found, expected
            )));
        }
        Ok(())
    }

    pub fn encode(buffer: &mut dyn WriteBuffer, data: &mut Ping) -> Result<(), CodecError> {
        buffer.write_uint8(checksum(data.seq))?;
        Ok(())
    }

    pub fn decode(buffer: &mut dyn ReadBuffer, data: &mut Ping) -> Result<(), CodecError> {
        let found = buffer.read_uint8()?;
        verify(data.seq, found)
    }

    fn seq(record: &Record) -> Result<u32, CodecError> {
        record
            .get("seq")
            .and_then(Value::as_integer)
            .and_then(|seq| u32::try_from(seq).ok())
            .ok_or_else(|| CodecError::MissingField {
                message: "Ping".to_owned(),
                field:   "seq".to_owned(),
            })
    }

    pub fn hook() -> Hook {
        Hook::on_encode(|buffer, record| {
            buffer.write_uint8(checksum(seq(record)?))?;
            Ok(())
        })
        .and_decode(|buffer, record| {
            let found = buffer.read_uint8()?;
            verify(seq(record)?, found)
        })
    }
}
